//! keg - installer for prebuilt tarball packages
//!
//! This is the CLI application; every command is carried out by the ops
//! crate while this binary renders its events and the final result.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod setup;

use crate::cli::{Cli, Commands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use crate::setup::SystemSetup;
use clap::Parser;
use keg_config::Config;
use keg_events::EventReceiver;
use keg_ops::{InstallOptions, OperationResult, OpsCtx};
use keg_types::OutputFormat;
use std::path::Path;
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let json_flag = cli.global.json;

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("Application error: {}", e);
            if json_flag {
                let body = serde_json::json!({
                    "type": "Error",
                    "data": {
                        "message": e.to_string(),
                        "code": e.code(),
                        "hint": e.hint(),
                    }
                });
                println!("{body:#}");
            } else {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}

/// Main application logic
///
/// Returns whether the command succeeded; a failed smoke test or audit is
/// rendered normally but still fails the process.
async fn run(cli: Cli) -> Result<bool, CliError> {
    // Defaults < config file < environment < flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global);

    let json_mode = cli.global.json || config.general.default_output == OutputFormat::Json;
    init_tracing(json_mode, cli.global.debug, &config.logs_dir());
    info!("Starting keg v{}", env!("CARGO_PKG_VERSION"));

    let (event_sender, event_receiver) = keg_events::channel();

    let mut setup = SystemSetup::new(config.clone());
    setup.initialize(&event_sender).await?;
    let ops_ctx = setup.into_context(event_sender)?;

    let renderer = OutputRenderer::new(json_mode, config.general.color);
    let mut event_handler =
        EventHandler::new(renderer.supports_color(), cli.global.debug, json_mode);

    let result =
        execute_command_with_events(cli.command, ops_ctx, event_receiver, &mut event_handler)
            .await?;

    renderer.render_result(&result)?;
    if let Some(failure) = result.test_failure() {
        let failure = CliError::from(keg_errors::Error::from(failure));
        info!(code = ?failure.code(), "smoke test failed");
        if !json_mode {
            eprintln!("Error: {failure}");
        }
    }

    let success = result.is_success();
    info!(success, "Command completed");
    Ok(success)
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    ops_ctx: OpsCtx,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, ops_ctx));

    loop {
        select! {
            result = &mut command_future => {
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                // None means every sender is gone; keep waiting for the command
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(command: Commands, ctx: OpsCtx) -> Result<OperationResult, CliError> {
    let result = match command {
        Commands::Install {
            formula,
            force,
            skip_test,
        } => {
            let options = InstallOptions { force, skip_test };
            OperationResult::InstallReport(keg_ops::install(&ctx, &formula, options).await?)
        }
        Commands::Fetch { formula } => {
            OperationResult::FetchReport(keg_ops::fetch(&ctx, &formula).await?)
        }
        Commands::Caveats { formula } => {
            OperationResult::Caveats(keg_ops::caveats(&ctx, &formula).await?)
        }
        Commands::Test { formula } => {
            OperationResult::TestResult(keg_ops::test(&ctx, &formula).await?)
        }
        Commands::Info { formula } => {
            OperationResult::FormulaInfo(keg_ops::info(&ctx, &formula).await?)
        }
        Commands::Audit { formula } => {
            OperationResult::AuditReport(keg_ops::audit(&ctx, &formula).await?)
        }
        Commands::List => OperationResult::PackageList(keg_ops::list(&ctx).await?),
        Commands::Uninstall { formula } => {
            OperationResult::UninstallReport(keg_ops::uninstall(&ctx, &formula).await?)
        }
    };
    Ok(result)
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs) {
    if let Some(color) = global.color {
        config.general.color = color;
    }
    if let Some(root) = &global.root {
        config.paths.root = Some(root.clone());
    }
    if global.json {
        config.general.default_output = OutputFormat::Json;
    }
}

/// Initialize tracing/logging
///
/// Debug mode writes JSON records to a timestamped file under `log_dir`.
/// JSON output mode keeps the console clean.
fn init_tracing(json_mode: bool, debug_flag: bool, log_dir: &Path) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_flag;

    if debug_enabled {
        if let Some(file) = create_log_file(log_dir, json_mode) {
            tracing_subscriber::fmt()
                .json()
                .with_writer(file)
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                        tracing_subscriber::EnvFilter::new(
                            "info,keg=debug,keg_ops=debug,keg_install=debug,keg_net=debug",
                        )
                    }),
                )
                .init();
            return;
        }
    }

    if json_mode {
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| {
                        // Events already reach the console through the event handler
                        tracing_subscriber::EnvFilter::new("error,keg::logging=off")
                    }),
            )
            .init();
    }
}

fn create_log_file(log_dir: &Path, quiet: bool) -> Option<std::fs::File> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        if !quiet {
            eprintln!("Warning: Failed to create log directory: {e}");
        }
        return None;
    }

    let log_file = log_dir.join(format!(
        "keg-{}.log",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));
    match std::fs::File::create(&log_file) {
        Ok(file) => {
            if !quiet {
                eprintln!("Debug logging enabled: {}", log_file.display());
            }
            Some(file)
        }
        Err(e) => {
            if !quiet {
                eprintln!("Warning: Failed to create log file: {e}");
            }
            None
        }
    }
}

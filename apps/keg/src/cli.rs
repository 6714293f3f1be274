//! Command line interface definition

use clap::{Parser, Subcommand};
use keg_types::ColorChoice;
use std::path::PathBuf;

/// keg - installer for prebuilt tarball packages
#[derive(Parser)]
#[command(name = "keg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Installer for prebuilt tarball packages")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to <root>/var/log/
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Install root (default /opt/keg)
    #[arg(long, global = true, value_name = "PATH")]
    pub root: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, verify and install a formula
    #[command(alias = "i")]
    Install {
        /// Formula name or path to a .toml descriptor
        formula: String,

        /// Replace an existing installation of the same version
        #[arg(long)]
        force: bool,

        /// Do not run the smoke test afterwards
        #[arg(long)]
        skip_test: bool,
    },

    /// Download and verify the archive without installing
    Fetch {
        /// Formula name or path to a .toml descriptor
        formula: String,
    },

    /// Show post-install notes
    Caveats {
        /// Formula name or path to a .toml descriptor
        formula: String,
    },

    /// Run the smoke test of an installed formula
    Test {
        /// Formula name or path to a .toml descriptor
        formula: String,
    },

    /// Show information about a formula
    Info {
        /// Formula name or path to a .toml descriptor
        formula: String,
    },

    /// Check a formula for common mistakes
    Audit {
        /// Formula name or path to a .toml descriptor
        formula: String,
    },

    /// List installed packages
    #[command(alias = "ls")]
    List,

    /// Remove an installed package
    #[command(alias = "rm")]
    Uninstall {
        /// Package name
        formula: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_install_flags() {
        let cli = Cli::try_parse_from([
            "keg",
            "--root",
            "/tmp/keg",
            "install",
            "powershell",
            "--force",
            "--skip-test",
        ])
        .unwrap();

        assert_eq!(cli.global.root, Some(PathBuf::from("/tmp/keg")));
        match cli.command {
            Commands::Install {
                formula,
                force,
                skip_test,
            } => {
                assert_eq!(formula, "powershell");
                assert!(force);
                assert!(skip_test);
            }
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["keg", "list", "--json", "--color", "never"]).unwrap();
        assert!(cli.global.json);
        assert_eq!(cli.global.color, Some(ColorChoice::Never));
    }

    #[test]
    fn test_formula_is_required() {
        assert!(Cli::try_parse_from(["keg", "install"]).is_err());
    }
}

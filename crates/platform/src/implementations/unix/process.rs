//! Unix process operations

use async_trait::async_trait;
use keg_errors::PlatformError;
use keg_events::{AppEvent, EventEmitter, PlatformEvent};
use tokio::process::Command;

use crate::core::{OperationTimer, PlatformContext};
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

pub struct UnixProcessOperations;

impl UnixProcessOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnixProcessOperations {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessOperations for UnixProcessOperations {
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, PlatformError> {
        ctx.emit(AppEvent::Platform(PlatformEvent::ProcessExecutionStarted {
            command: cmd.program().to_string(),
            args: cmd.get_args().to_vec(),
            working_dir: cmd.get_current_dir().map(|d| d.display().to_string()),
        }));

        let timer = OperationTimer::start();
        let mut command = Command::new(cmd.program());
        command.args(cmd.get_args()).kill_on_drop(true);
        if let Some(dir) = cmd.get_current_dir() {
            command.current_dir(dir);
        }
        for (key, value) in cmd.get_env_vars() {
            command.env(key, value);
        }

        match command.output().await {
            Ok(output) => {
                ctx.emit(AppEvent::Platform(PlatformEvent::ProcessExecutionCompleted {
                    command: cmd.program().to_string(),
                    exit_code: output.status.code(),
                    duration_ms: timer.elapsed_ms(),
                    stdout_bytes: output.stdout.len(),
                    stderr_bytes: output.stderr.len(),
                }));
                Ok(CommandOutput {
                    status: output.status,
                    stdout: output.stdout,
                    stderr: output.stderr,
                })
            }
            Err(e) => {
                let error = if e.kind() == std::io::ErrorKind::NotFound {
                    PlatformError::CommandNotFound {
                        command: cmd.program().to_string(),
                    }
                } else {
                    PlatformError::ProcessExecutionFailed {
                        command: cmd.program().to_string(),
                        message: e.to_string(),
                    }
                };
                ctx.emit(AppEvent::Platform(PlatformEvent::ProcessExecutionFailed {
                    command: cmd.program().to_string(),
                    error_message: error.to_string(),
                    duration_ms: timer.elapsed_ms(),
                }));
                Err(error)
            }
        }
    }
}

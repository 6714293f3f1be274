//! Platform-specific operation events

use serde::{Deserialize, Serialize};

/// Filesystem and process operations performed through the platform layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PlatformEvent {
    FilesystemOperationStarted {
        /// Operation name (e.g. `symlink`, `set_permissions`)
        operation: String,
        target_path: String,
    },

    FilesystemOperationCompleted {
        operation: String,
        target_path: String,
        duration_ms: u64,
    },

    FilesystemOperationFailed {
        operation: String,
        target_path: String,
        error_message: String,
        duration_ms: u64,
    },

    ProcessExecutionStarted {
        command: String,
        args: Vec<String>,
        working_dir: Option<String>,
    },

    ProcessExecutionCompleted {
        command: String,
        /// `None` if the process was killed by a signal
        exit_code: Option<i32>,
        duration_ms: u64,
        stdout_bytes: usize,
        stderr_bytes: usize,
    },

    ProcessExecutionFailed {
        command: String,
        error_message: String,
        duration_ms: u64,
    },

    /// The host operating system was identified
    HostDetected {
        family: String,
        version: Option<String>,
    },
}

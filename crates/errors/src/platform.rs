//! Platform-specific operation errors

use std::borrow::Cow;

use crate::{InstallError, UserFacingError};
use thiserror::Error;

/// Errors that can occur during platform-specific operations
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("filesystem operation failed: {operation} on {path} - {message}")]
    FilesystemOperationFailed {
        operation: String,
        path: String,
        message: String,
    },

    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("command not found: {command}")]
    CommandNotFound { command: String },

    #[error("could not determine host platform: {message}")]
    HostDetectionFailed { message: String },

    #[error("permission denied: {operation} on {path} - {message}")]
    PermissionDenied {
        operation: String,
        path: String,
        message: String,
    },
}

impl PlatformError {
    /// Classify an I/O failure for `operation` on `path`
    #[must_use]
    pub fn from_io(operation: &str, path: &std::path::Path, err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied {
                operation: operation.to_string(),
                path: path.display().to_string(),
                message: err.to_string(),
            }
        } else {
            Self::FilesystemOperationFailed {
                operation: operation.to_string(),
                path: path.display().to_string(),
                message: err.to_string(),
            }
        }
    }
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::PermissionDenied { .. } => Some("Check ownership and permissions of the path."),
            Self::HostDetectionFailed { .. } => {
                Some("Set KEG_OS_VERSION to override host detection.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::FilesystemOperationFailed { .. } => "platform.filesystem",
            Self::ProcessExecutionFailed { .. } => "platform.process",
            Self::CommandNotFound { .. } => "platform.command_not_found",
            Self::HostDetectionFailed { .. } => "platform.host_detection",
            Self::PermissionDenied { .. } => "platform.permission_denied",
        };
        Some(code)
    }
}

impl From<PlatformError> for InstallError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::PermissionDenied {
                operation,
                path,
                message,
            } => InstallError::PermissionDenied {
                operation,
                path,
                message,
            },
            PlatformError::FilesystemOperationFailed {
                operation,
                path,
                message,
            } => InstallError::FilesystemError {
                operation,
                path,
                message,
            },
            _ => InstallError::Failed {
                message: err.to_string(),
            },
        }
    }
}

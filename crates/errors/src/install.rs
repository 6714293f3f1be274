//! Installation error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum InstallError {
    #[error("installation failed: {message}")]
    Failed { message: String },

    #[error("{package} requires {required}, but this system is {current}")]
    PlatformUnsupported {
        package: String,
        required: String,
        current: String,
    },

    #[error("{package} conflicts with {kind} {conflicting}, which is already installed")]
    Conflict {
        package: String,
        conflicting: String,
        kind: String,
    },

    #[error("{package} {version} is already installed at {path}")]
    AlreadyInstalled {
        package: String,
        version: String,
        path: String,
    },

    #[error("permission denied: {operation} on {path}: {message}")]
    PermissionDenied {
        operation: String,
        path: String,
        message: String,
    },

    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("install step {step} failed: {path} does not exist")]
    MissingExecutable { step: usize, path: String },

    #[error("link {path} already exists and points elsewhere")]
    LinkExists { path: String },

    #[error("filesystem operation failed: {operation} on {path}: {message}")]
    FilesystemError {
        operation: String,
        path: String,
        message: String,
    },

    #[error("smoke test failed: `{invocation}` {status}")]
    TestFailure { invocation: String, status: String },

    #[error("package not installed: {package}")]
    NotInstalled { package: String },

    #[error("invalid install receipt {path}: {message}")]
    InvalidReceipt { path: String, message: String },
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::PlatformUnsupported { .. } => {
                Some("Upgrade the operating system or install a release built for it.")
            }
            Self::Conflict { .. } => {
                Some("Uninstall the conflicting package first; both cannot be installed together.")
            }
            Self::AlreadyInstalled { .. } => Some("Pass --force to reinstall."),
            Self::PermissionDenied { .. } => {
                Some("Ensure the install root is writable by the current user.")
            }
            Self::LinkExists { .. } => Some("Remove the existing link or uninstall its owner."),
            Self::TestFailure { .. } => Some(
                "The package was installed but did not pass its smoke test; inspect the test output.",
            ),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Failed { .. } => "install.failed",
            Self::PlatformUnsupported { .. } => "install.platform_unsupported",
            Self::Conflict { .. } => "install.conflict",
            Self::AlreadyInstalled { .. } => "install.already_installed",
            Self::PermissionDenied { .. } => "install.permission_denied",
            Self::ExtractionFailed { .. } => "install.extraction_failed",
            Self::MissingExecutable { .. } => "install.missing_executable",
            Self::LinkExists { .. } => "install.link_exists",
            Self::FilesystemError { .. } => "install.filesystem_error",
            Self::TestFailure { .. } => "install.test_failure",
            Self::NotInstalled { .. } => "install.not_installed",
            Self::InvalidReceipt { .. } => "install.invalid_receipt",
        };
        Some(code)
    }
}

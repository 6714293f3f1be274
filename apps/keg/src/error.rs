//! CLI error handling

use std::fmt;

use keg_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(keg_errors::Error),
    /// Operations error
    Ops(keg_errors::Error),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Machine-readable code for `--json` output
    pub fn code(&self) -> Option<&'static str> {
        match self {
            CliError::Config(e) | CliError::Ops(e) => e.user_code(),
            CliError::Io(_) => None,
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::Config(e) | CliError::Ops(e) => e.user_hint(),
            CliError::Io(_) => None,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e.user_message()),
            CliError::Ops(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) | CliError::Ops(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<keg_errors::Error> for CliError {
    fn from(e: keg_errors::Error) -> Self {
        match e {
            keg_errors::Error::Config(_) => CliError::Config(e),
            other => CliError::Ops(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

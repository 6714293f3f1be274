//! Formula (package descriptor) error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum FormulaError {
    #[error("formula not found: {name}")]
    NotFound { name: String },

    #[error("failed to parse formula {source_name}: {message}")]
    ParseError {
        source_name: String,
        message: String,
    },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("invalid {algorithm} checksum {value:?}: {reason}")]
    InvalidChecksum {
        algorithm: String,
        value: String,
        reason: String,
    },

    #[error("invalid path {value:?}: {reason}")]
    InvalidPath { value: String, reason: String },

    #[error("invalid file mode {value:?}")]
    InvalidMode { value: String },

    #[error("cannot infer a version from {url}")]
    VersionNotInferable { url: String },

    #[error("invalid field {field}: {message}")]
    InvalidField { field: String, message: String },
}

impl UserFacingError for FormulaError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Check the formula name or pass a path to a .toml formula file.")
            }
            Self::InvalidChecksum { .. } => {
                Some("A SHA-256 digest is exactly 64 hexadecimal characters.")
            }
            Self::VersionNotInferable { .. } => Some("Add an explicit `version` to the formula."),
            Self::InvalidPath { .. } => Some(
                "Paths start with prefix/, libexec/ or bin/ and may not contain `..` components.",
            ),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "formula.not_found",
            Self::ParseError { .. } => "formula.parse_error",
            Self::MissingField { .. } => "formula.missing_field",
            Self::InvalidChecksum { .. } => "formula.invalid_checksum",
            Self::InvalidPath { .. } => "formula.invalid_path",
            Self::InvalidMode { .. } => "formula.invalid_mode",
            Self::VersionNotInferable { .. } => "formula.version_not_inferable",
            Self::InvalidField { .. } => "formula.invalid_field",
        };
        Some(code)
    }
}

//! OS version parsing error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum VersionError {
    #[error("invalid version: {input}")]
    InvalidVersion { input: String },

    #[error("unknown macOS release name: {input}")]
    UnknownReleaseName { input: String },
}

impl UserFacingError for VersionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidVersion { .. } => Some("Use dotted numeric versions like 10.13 or 10.13.6."),
            Self::UnknownReleaseName { .. } => {
                Some("Use a release name such as high_sierra or mojave, or a numeric version.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidVersion { .. } => "version.invalid_version",
            Self::UnknownReleaseName { .. } => "version.unknown_release_name",
        };
        Some(code)
    }
}

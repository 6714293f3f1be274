//! Declared archive checksums

use keg_errors::FormulaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Sha256,
}

impl ChecksumAlgorithm {
    /// Length of the hex encoding of a digest
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => 64,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, lower-case hex digest the downloaded archive must match
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Checksum {
    pub algorithm: ChecksumAlgorithm,
    digest: String,
    #[serde(skip)]
    declared_uppercase: bool,
}

impl Checksum {
    /// Parse a declared digest for `algorithm`
    ///
    /// # Errors
    ///
    /// Returns an error if the value has the wrong length or contains
    /// non-hexadecimal characters.
    pub fn parse(algorithm: ChecksumAlgorithm, value: &str) -> Result<Self, FormulaError> {
        let invalid = |reason: String| FormulaError::InvalidChecksum {
            algorithm: algorithm.to_string(),
            value: value.to_string(),
            reason,
        };

        let trimmed = value.trim();
        if trimmed.len() != algorithm.hex_len() {
            return Err(invalid(format!(
                "expected {} hex characters, found {}",
                algorithm.hex_len(),
                trimmed.len()
            )));
        }
        if let Some(bad) = trimmed.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(invalid(format!("{bad:?} is not a hex digit")));
        }

        Ok(Self {
            algorithm,
            digest: trimmed.to_ascii_lowercase(),
            declared_uppercase: trimmed.chars().any(|c| c.is_ascii_uppercase()),
        })
    }

    /// Parse a SHA-256 digest
    ///
    /// # Errors
    ///
    /// See [`Checksum::parse`].
    pub fn sha256(value: &str) -> Result<Self, FormulaError> {
        Self::parse(ChecksumAlgorithm::Sha256, value)
    }

    /// The normalized (lower-case) digest
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Whether the declaration used upper-case hex
    #[must_use]
    pub fn declared_uppercase(&self) -> bool {
        self.declared_uppercase
    }

    /// Compare against a computed hex digest, ignoring case
    #[must_use]
    pub fn matches(&self, actual_hex: &str) -> bool {
        self.digest.eq_ignore_ascii_case(actual_hex)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.digest)
    }
}

impl<'de> Deserialize<'de> for Checksum {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            algorithm: ChecksumAlgorithm,
            digest: String,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::parse(raw.algorithm, &raw.digest).map_err(serde::de::Error::custom)
    }
}

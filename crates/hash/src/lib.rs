#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! SHA-256 digests for archive verification
//!
//! Downloads are hashed while they stream to disk; archives already on disk
//! are hashed in fixed-size chunks.

use keg_errors::{Error, FormulaError};
use keg_types::Checksum;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Size of chunks for streaming hash computation
const CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// A SHA-256 hash value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hash {
    bytes: [u8; 32],
}

impl Hash {
    /// Create a hash from raw bytes
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Lower-case hex encoding
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse from hex string, either case
    ///
    /// # Errors
    /// Returns an error if the input is not valid hexadecimal or is not exactly 64 characters.
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let invalid = |reason: String| FormulaError::InvalidChecksum {
            algorithm: "sha256".to_string(),
            value: s.to_string(),
            reason,
        };

        let bytes = hex::decode(s).map_err(|e| invalid(format!("invalid hex: {e}")))?;
        let array: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| invalid(format!("hash must be 32 bytes, got {}", bytes.len())))?;
        Ok(Self::from_bytes(array))
    }

    /// Compute hash of a byte slice
    #[must_use]
    pub fn from_data(data: &[u8]) -> Self {
        Self::from_bytes(Sha256::digest(data).into())
    }

    /// Compute hash of a file
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read.
    pub async fn hash_file(path: &Path) -> Result<Self, Error> {
        let mut file = File::open(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;

        let mut hasher = Hasher::new();
        let mut buffer = vec![0; CHUNK_SIZE];

        loop {
            let n = file
                .read(&mut buffer)
                .await
                .map_err(|e| Error::io_with_path(&e, path))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(hasher.finalize())
    }

    /// Whether this digest equals a declared checksum
    #[must_use]
    pub fn matches(&self, checksum: &Checksum) -> bool {
        checksum.matches(&self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Incremental hasher fed chunk by chunk as a download arrives
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    inner: Sha256,
    bytes: u64,
}

impl Hasher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.inner.update(chunk);
        self.bytes += chunk.len() as u64;
    }

    /// Number of bytes fed so far
    #[must_use]
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes
    }

    #[must_use]
    pub fn finalize(self) -> Hash {
        Hash::from_bytes(self.inner.finalize().into())
    }
}

/// Verify a file matches a declared checksum, returning the computed hash
///
/// # Errors
/// Returns an error if the file cannot be read or hashed.
pub async fn verify_file(path: &Path, expected: &Checksum) -> Result<(bool, Hash), Error> {
    let actual = Hash::hash_file(path).await?;
    Ok((actual.matches(expected), actual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const HELLO_WORLD: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
    const EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_hash_basics() {
        assert_eq!(Hash::from_data(b"hello world").to_hex(), HELLO_WORLD);
        assert_eq!(Hash::from_data(b"").to_hex(), EMPTY);
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let mut hasher = Hasher::new();
        hasher.update(b"hello");
        hasher.update(b" ");
        hasher.update(b"world");
        assert_eq!(hasher.bytes_hashed(), 11);
        assert_eq!(hasher.finalize().to_hex(), HELLO_WORLD);
    }

    #[test]
    fn test_from_hex_accepts_uppercase() {
        let hash = Hash::from_hex(&HELLO_WORLD.to_ascii_uppercase()).unwrap();
        assert_eq!(hash.to_hex(), HELLO_WORLD);
        assert!(Hash::from_hex("abcd").is_err());
        assert!(Hash::from_hex(&HELLO_WORLD.replace('b', "x")).is_err());
    }

    #[test]
    fn test_hash_serialization() {
        let hash = Hash::from_data(b"test");
        let json = serde_json::to_string(&hash).unwrap();
        let deserialized: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, deserialized);
    }

    #[tokio::test]
    async fn test_verify_file() {
        use std::io::Write;
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"hello world").unwrap();

        let good = Checksum::sha256(HELLO_WORLD).unwrap();
        let (ok, actual) = verify_file(temp.path(), &good).await.unwrap();
        assert!(ok);
        assert_eq!(actual.to_hex(), HELLO_WORLD);

        let bad = Checksum::sha256(EMPTY).unwrap();
        let (ok, _) = verify_file(temp.path(), &bad).await.unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let err = Hash::hash_file(Path::new("/nonexistent/archive.tar.gz"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { path: Some(_), .. }));
    }
}

#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for keg
//!
//! This crate fetches package archives over HTTP(S) or from `file://` URLs
//! and verifies their SHA-256 digest while the bytes are written to disk.

mod client;
mod download;

pub use client::{NetClient, NetConfig};
pub use download::{find_verified, validate_url, Download, VerifiedArchive};

use keg_errors::Error;
use keg_events::EventEmitter;
use keg_types::Checksum;
use std::path::Path;

/// Download `url` to `dest` and verify it against `expected`
///
/// On success the archive is at `dest` and its digest equals `expected`.
/// On any failure, including a digest mismatch, `dest` is left untouched.
///
/// # Errors
///
/// Returns `NetworkError::ChecksumMismatch` if the digest differs, or another
/// network error if the URL is unsupported or the transfer fails.
pub async fn fetch_and_verify<E>(
    client: &NetClient,
    url: &str,
    expected: &Checksum,
    dest: &Path,
    emitter: &E,
    package: Option<&str>,
) -> Result<VerifiedArchive, Error>
where
    E: EventEmitter,
{
    let mut download = Download::new(url)?;
    if let Some(name) = package {
        download = download.for_package(name);
    }
    download.execute(client, dest, expected, emitter).await
}

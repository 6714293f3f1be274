//! Archive download with streaming SHA-256 verification

use futures::StreamExt;
use keg_errors::{Error, NetworkError, UserFacingError};
use keg_events::{AppEvent, DownloadEvent, EventEmitter, FailureContext};
use keg_hash::{Hash, Hasher};
use keg_types::Checksum;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use url::Url;

use crate::NetClient;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(50);
const FILE_CHUNK_SIZE: usize = 64 * 1024;

/// A downloaded archive whose digest matched the declared checksum
#[derive(Debug, Clone)]
pub struct VerifiedArchive {
    pub url: String,
    pub path: PathBuf,
    pub size: u64,
    pub hash: Hash,
}

/// Download operation handle
pub struct Download {
    url: Url,
    package: Option<String>,
}

impl Download {
    /// Create a new download
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or its scheme is not
    /// `http`, `https` or `file`.
    pub fn new(url: &str) -> Result<Self, Error> {
        Ok(Self {
            url: validate_url(url)?,
            package: None,
        })
    }

    /// Name the package in emitted events
    #[must_use]
    pub fn for_package(mut self, package: &str) -> Self {
        self.package = Some(package.to_string());
        self
    }

    /// Download to `dest` and verify against `expected`
    ///
    /// Data is written to a sibling `.incomplete` file and only renamed to
    /// `dest` once the digest matches; on any failure nothing is left at
    /// `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::ChecksumMismatch`] if the digest differs, or
    /// a network/I/O error if the transfer cannot complete.
    pub async fn execute<E>(
        self,
        client: &NetClient,
        dest: &Path,
        expected: &Checksum,
        emitter: &E,
    ) -> Result<VerifiedArchive, Error>
    where
        E: EventEmitter,
    {
        let url = self.url.to_string();
        let partial = partial_path(dest);

        let result = self.transfer(client, &partial, emitter).await.and_then(
            |(hash, size)| {
                if hash.matches(expected) {
                    Ok((hash, size))
                } else {
                    Err(NetworkError::ChecksumMismatch {
                        url: url.clone(),
                        expected: expected.digest().to_string(),
                        actual: hash.to_hex(),
                    }
                    .into())
                }
            },
        );

        let (hash, size) = match result {
            Ok(done) => done,
            Err(err) => {
                let _ = fs::remove_file(&partial).await;
                self.emit_failed(emitter, &err);
                return Err(err);
            }
        };

        if let Err(e) = fs::rename(&partial, dest).await {
            let _ = fs::remove_file(&partial).await;
            let err = Error::io_with_path(&e, dest);
            self.emit_failed(emitter, &err);
            return Err(err);
        }

        emitter.emit(AppEvent::Download(DownloadEvent::Verified {
            url: url.clone(),
            package: self.package.clone(),
            sha256: hash.to_hex(),
        }));
        tracing::debug!(%url, dest = %dest.display(), size, "archive verified");

        Ok(VerifiedArchive {
            url,
            path: dest.to_path_buf(),
            size,
            hash,
        })
    }

    async fn transfer<E>(
        &self,
        client: &NetClient,
        partial: &Path,
        emitter: &E,
    ) -> Result<(Hash, u64), Error>
    where
        E: EventEmitter,
    {
        if let Some(parent) = partial.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_path(&e, parent))?;
        }
        let mut file = File::create(partial)
            .await
            .map_err(|e| Error::io_with_path(&e, partial))?;

        let (hash, size) = if self.url.scheme() == "file" {
            self.copy_local(&mut file, emitter).await?
        } else {
            self.stream_http(client, &mut file, emitter).await?
        };

        file.flush()
            .await
            .map_err(|e| Error::io_with_path(&e, partial))?;
        Ok((hash, size))
    }

    async fn stream_http<E>(
        &self,
        client: &NetClient,
        file: &mut File,
        emitter: &E,
    ) -> Result<(Hash, u64), Error>
    where
        E: EventEmitter,
    {
        let url = self.url.as_str();
        let response = client.get(url).await?;
        let total = response.content_length();
        emitter.emit_download_started(url, self.package.clone(), total);

        let mut progress = ProgressThrottle::new(url, total);
        let mut hasher = Hasher::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| crate::client::classify(url, &e))?;
            hasher.update(&chunk);
            file.write_all(&chunk).await?;
            progress.advance(emitter, hasher.bytes_hashed());
        }

        let size = hasher.bytes_hashed();
        progress.finish(emitter, size);
        emitter.emit_download_completed(url, self.package.clone(), size);
        Ok((hasher.finalize(), size))
    }

    async fn copy_local<E>(&self, file: &mut File, emitter: &E) -> Result<(Hash, u64), Error>
    where
        E: EventEmitter,
    {
        let url = self.url.as_str();
        let source = self
            .url
            .to_file_path()
            .map_err(|()| NetworkError::InvalidUrl(format!("{url} is not a local path")))?;

        let mut input = File::open(&source).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::from(NetworkError::DownloadFailed(format!(
                    "{} does not exist",
                    source.display()
                )))
            } else {
                Error::io_with_path(&e, &source)
            }
        })?;
        let total = input.metadata().await.ok().map(|m| m.len());
        emitter.emit_download_started(url, self.package.clone(), total);

        let mut progress = ProgressThrottle::new(url, total);
        let mut hasher = Hasher::new();
        let mut buffer = vec![0; FILE_CHUNK_SIZE];
        loop {
            let n = input
                .read(&mut buffer)
                .await
                .map_err(|e| Error::io_with_path(&e, &source))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
            file.write_all(&buffer[..n]).await?;
            progress.advance(emitter, hasher.bytes_hashed());
        }

        let size = hasher.bytes_hashed();
        progress.finish(emitter, size);
        emitter.emit_download_completed(url, self.package.clone(), size);
        Ok((hasher.finalize(), size))
    }

    fn emit_failed<E: EventEmitter>(&self, emitter: &E, error: &Error) {
        emitter.emit(AppEvent::Download(DownloadEvent::Failed {
            url: self.url.to_string(),
            package: self.package.clone(),
            failure: FailureContext::from_error(error),
        }));
        tracing::warn!(url = %self.url, code = ?error.user_code(), "download failed");
    }
}

/// Reuse an archive already at `dest` if its digest still matches
///
/// # Errors
///
/// Returns an error only if an existing file cannot be read.
pub async fn find_verified(
    url: &str,
    dest: &Path,
    expected: &Checksum,
) -> Result<Option<VerifiedArchive>, Error> {
    if !fs::try_exists(dest).await.unwrap_or(false) {
        return Ok(None);
    }
    let (matches, hash) = keg_hash::verify_file(dest, expected).await?;
    if !matches {
        tracing::debug!(path = %dest.display(), "cached archive is stale");
        return Ok(None);
    }
    let size = fs::metadata(dest)
        .await
        .map_err(|e| Error::io_with_path(&e, dest))?
        .len();
    Ok(Some(VerifiedArchive {
        url: url.to_string(),
        path: dest.to_path_buf(),
        size,
        hash,
    }))
}

/// Validate URL and check for supported protocols
///
/// # Errors
///
/// Returns an error for malformed URLs and unsupported schemes.
pub fn validate_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" | "file" => Ok(parsed),
        scheme => Err(NetworkError::UnsupportedProtocol {
            protocol: scheme.to_string(),
        }
        .into()),
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(".incomplete");
    PathBuf::from(name)
}

/// Rate-limits progress events to one per interval
struct ProgressThrottle<'a> {
    url: &'a str,
    total: Option<u64>,
    last: Option<Instant>,
}

impl<'a> ProgressThrottle<'a> {
    fn new(url: &'a str, total: Option<u64>) -> Self {
        Self {
            url,
            total,
            last: None,
        }
    }

    fn advance<E: EventEmitter>(&mut self, emitter: &E, downloaded: u64) {
        if self.last.is_none_or(|t| t.elapsed() >= PROGRESS_INTERVAL) {
            emitter.emit_download_progress(self.url, downloaded, self.total);
            self.last = Some(Instant::now());
        }
    }

    fn finish<E: EventEmitter>(&self, emitter: &E, downloaded: u64) {
        emitter.emit_download_progress(self.url, downloaded, self.total);
    }
}

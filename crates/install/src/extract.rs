//! Archive extraction into a staging directory

use flate2::read::GzDecoder;
use keg_errors::{Error, InstallError};
use std::fs::File;
use std::path::{Path, PathBuf};
use tar::Archive;

/// Unpack a gzip-compressed tar into `dest`
///
/// Returns the directory holding the package files: `dest` itself, or the
/// archive's single top-level directory when it has exactly one. Entries that
/// would land outside `dest` are skipped by the unpacker.
///
/// # Errors
///
/// Returns [`InstallError::ExtractionFailed`] if the archive cannot be read,
/// is not a gzip tar, or is empty.
pub async fn extract_archive(archive_path: &Path, dest: &Path) -> Result<PathBuf, Error> {
    let archive_path = archive_path.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || unpack_tar_gz(&archive_path, &dest))
        .await
        .map_err(|e| InstallError::ExtractionFailed {
            message: format!("task join error: {e}"),
        })?
}

fn unpack_tar_gz(archive_path: &Path, dest: &Path) -> Result<PathBuf, Error> {
    let file = File::open(archive_path).map_err(|e| Error::io_with_path(&e, archive_path))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.set_preserve_mtime(true);

    archive
        .unpack(dest)
        .map_err(|e| InstallError::ExtractionFailed {
            message: format!("{}: {e}", archive_path.display()),
        })?;

    let mut entries = std::fs::read_dir(dest)
        .map_err(|e| Error::io_with_path(&e, dest))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| Error::io_with_path(&e, dest))?;

    match entries.len() {
        0 => Err(InstallError::ExtractionFailed {
            message: format!("{} contains no files", archive_path.display()),
        }
        .into()),
        1 => {
            let entry = entries.remove(0);
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            if is_dir {
                tracing::debug!(top = %entry.path().display(), "stripping top-level directory");
                Ok(entry.path())
            } else {
                Ok(dest.to_path_buf())
            }
        }
        _ => Ok(dest.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    fn tar_gz(path: &Path, files: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[tokio::test]
    async fn test_flat_archive_extracts_in_place() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("flat.tar.gz");
        tar_gz(&archive, &[("pwsh", b"#!/bin/sh\n"), ("lib/x.dll", b"x")]);

        let dest = temp.path().join("stage");
        std::fs::create_dir(&dest).unwrap();
        let root = extract_archive(&archive, &dest).await.unwrap();

        assert_eq!(root, dest);
        assert!(root.join("pwsh").is_file());
        assert!(root.join("lib/x.dll").is_file());
    }

    #[tokio::test]
    async fn test_single_top_level_directory_is_stripped() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("nested.tar.gz");
        tar_gz(
            &archive,
            &[("pkg-1.0/pwsh", b"#!/bin/sh\n"), ("pkg-1.0/README", b"hi")],
        );

        let dest = temp.path().join("stage");
        std::fs::create_dir(&dest).unwrap();
        let root = extract_archive(&archive, &dest).await.unwrap();

        assert_eq!(root, dest.join("pkg-1.0"));
        assert!(root.join("pwsh").is_file());
    }

    #[tokio::test]
    async fn test_garbage_is_rejected() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("garbage.tar.gz");
        std::fs::write(&archive, b"definitely not gzip").unwrap();

        let dest = temp.path().join("stage");
        std::fs::create_dir(&dest).unwrap();
        let err = extract_archive(&archive, &dest).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Install(InstallError::ExtractionFailed { .. })
        ));
    }
}

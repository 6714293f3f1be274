//! Install receipt persistence

use keg_errors::{Error, InstallError};
use keg_types::{InstallReceipt, InstalledLayout, RECEIPT_FILE};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Write `receipt` as pretty-printed JSON
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub async fn write_receipt(path: &Path, receipt: &InstallReceipt) -> Result<(), Error> {
    let json = serde_json::to_string_pretty(receipt)?;
    fs::write(path, json)
        .await
        .map_err(|e| Error::io_with_path(&e, path))
}

/// Read a receipt written by [`write_receipt`]
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or
/// [`InstallError::InvalidReceipt`] if it does not parse.
pub async fn read_receipt(path: &Path) -> Result<InstallReceipt, Error> {
    let contents = fs::read_to_string(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;
    serde_json::from_str(&contents).map_err(|e| {
        InstallError::InvalidReceipt {
            path: path.display().to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Receipt paths of every installed version of `name`, sorted
pub(crate) async fn receipts_for(root: &Path, name: &str) -> Result<Vec<PathBuf>, Error> {
    let package_dir = InstalledLayout::package_dir(root, name);
    let mut found = Vec::new();
    for version_dir in subdirectories(&package_dir).await? {
        let receipt = version_dir.join(RECEIPT_FILE);
        if fs::try_exists(&receipt).await.unwrap_or(false) {
            found.push(receipt);
        }
    }
    Ok(found)
}

/// Names of every package directory in the cellar, sorted
pub(crate) async fn cellar_packages(root: &Path) -> Result<Vec<String>, Error> {
    Ok(subdirectories(&InstalledLayout::cellar(root))
        .await?
        .iter()
        .filter_map(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect())
}

async fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io_with_path(&e, dir)),
    };

    let mut dirs = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io_with_path(&e, dir))?
    {
        if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

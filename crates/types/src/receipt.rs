//! Install receipts written into every keg

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the receipt inside the keg prefix
pub const RECEIPT_FILE: &str = "INSTALL_RECEIPT.json";

/// Something created on disk by an install, removed again on uninstall
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstalledArtifact {
    /// The versioned keg directory
    Keg { path: PathBuf },
    /// A command symlinked into the public bin directory
    BinaryLink {
        link_path: PathBuf,
        target_path: PathBuf,
    },
}

/// Record of a completed install
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallReceipt {
    pub name: String,
    pub version: String,
    pub source_url: String,
    pub sha256: String,
    pub installed_at: DateTime<Utc>,
    pub artifacts: Vec<InstalledArtifact>,
}

impl InstallReceipt {
    #[must_use]
    pub fn new(name: &str, version: &str, source_url: &str, sha256: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            source_url: source_url.to_string(),
            sha256: sha256.to_string(),
            installed_at: Utc::now(),
            artifacts: Vec::new(),
        }
    }

    /// Links this install placed in the bin directory
    pub fn links(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.artifacts.iter().filter_map(|artifact| match artifact {
            InstalledArtifact::BinaryLink {
                link_path,
                target_path,
            } => Some((link_path.as_path(), target_path.as_path())),
            InstalledArtifact::Keg { .. } => None,
        })
    }

    #[must_use]
    pub fn keg_path(&self) -> Option<&Path> {
        self.artifacts.iter().find_map(|artifact| match artifact {
            InstalledArtifact::Keg { path } => Some(path.as_path()),
            InstalledArtifact::BinaryLink { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_json_shape() {
        let mut receipt = InstallReceipt::new("powershell", "7.0.0", "https://x/p.tar.gz", "ab");
        receipt.artifacts.push(InstalledArtifact::Keg {
            path: PathBuf::from("/opt/keg/Cellar/powershell/7.0.0"),
        });
        receipt.artifacts.push(InstalledArtifact::BinaryLink {
            link_path: PathBuf::from("/opt/keg/bin/pwsh"),
            target_path: PathBuf::from("/opt/keg/Cellar/powershell/7.0.0/libexec/pwsh"),
        });

        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["artifacts"][1]["type"], "binary_link");

        let back: InstallReceipt = serde_json::from_value(json).unwrap();
        assert_eq!(back, receipt);
        assert_eq!(back.links().count(), 1);
        assert_eq!(
            back.keg_path(),
            Some(Path::new("/opt/keg/Cellar/powershell/7.0.0"))
        );
    }
}

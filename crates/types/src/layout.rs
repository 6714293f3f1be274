//! Directory layout of an installed package

use crate::formula::{KegDir, KegPath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the directory holding one keg per installed version
pub const CELLAR_DIR: &str = "Cellar";

/// Name of the directory cask installs are recorded under
pub const CASKROOM_DIR: &str = "Caskroom";

/// Absolute paths the install steps of one package write to
///
/// ```text
/// <root>/Cellar/<name>/<version>          prefix
/// <root>/Cellar/<name>/<version>/libexec  libexec
/// <root>/bin                              bin
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledLayout {
    pub root: PathBuf,
    pub prefix: PathBuf,
    pub libexec: PathBuf,
    pub bin: PathBuf,
}

impl InstalledLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, name: &str, version: &str) -> Self {
        let root = root.into();
        let prefix = Self::package_dir(&root, name).join(version);
        Self {
            libexec: prefix.join("libexec"),
            bin: root.join("bin"),
            prefix,
            root,
        }
    }

    /// `<root>/Cellar`
    #[must_use]
    pub fn cellar(root: &Path) -> PathBuf {
        root.join(CELLAR_DIR)
    }

    /// `<root>/Cellar/<name>`, the parent of every installed version
    #[must_use]
    pub fn package_dir(root: &Path, name: &str) -> PathBuf {
        Self::cellar(root).join(name)
    }

    /// `<root>/Caskroom/<name>`
    #[must_use]
    pub fn caskroom_dir(root: &Path, name: &str) -> PathBuf {
        root.join(CASKROOM_DIR).join(name)
    }

    #[must_use]
    pub fn dir(&self, dir: KegDir) -> &Path {
        match dir {
            KegDir::Prefix => &self.prefix,
            KegDir::Libexec => &self.libexec,
            KegDir::Bin => &self.bin,
        }
    }

    /// Absolute location of a layout-relative path
    #[must_use]
    pub fn resolve(&self, path: &KegPath) -> PathBuf {
        self.dir(path.dir).join(path.relative())
    }

    #[must_use]
    pub fn receipt_path(&self) -> PathBuf {
        self.prefix.join(crate::receipt::RECEIPT_FILE)
    }
}

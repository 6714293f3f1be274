//! Filesystem operations used while installing a keg

use async_trait::async_trait;
use keg_errors::PlatformError;
use std::path::{Path, PathBuf};

use crate::core::PlatformContext;

/// Filesystem primitives the installer is built on
///
/// Failures caused by missing permissions surface as
/// [`PlatformError::PermissionDenied`].
#[async_trait]
pub trait FilesystemOperations: Send + Sync {
    /// Create directory and all parent directories
    async fn create_dir_all(&self, ctx: &PlatformContext, path: &Path)
        -> Result<(), PlatformError>;

    /// Remove directory and all contents
    async fn remove_dir_all(&self, ctx: &PlatformContext, path: &Path)
        -> Result<(), PlatformError>;

    /// Remove a directory only if it is empty; returns whether it was removed
    async fn remove_empty_dir(
        &self,
        ctx: &PlatformContext,
        path: &Path,
    ) -> Result<bool, PlatformError>;

    async fn remove_file(&self, ctx: &PlatformContext, path: &Path) -> Result<(), PlatformError>;

    /// Move `src` to `dst` on the same filesystem
    async fn rename(
        &self,
        ctx: &PlatformContext,
        src: &Path,
        dst: &Path,
    ) -> Result<(), PlatformError>;

    /// Set Unix permission bits
    async fn set_permissions(
        &self,
        ctx: &PlatformContext,
        path: &Path,
        mode: u32,
    ) -> Result<(), PlatformError>;

    /// Create `link` pointing at `target`
    async fn symlink(
        &self,
        ctx: &PlatformContext,
        target: &Path,
        link: &Path,
    ) -> Result<(), PlatformError>;

    async fn read_link(&self, ctx: &PlatformContext, path: &Path)
        -> Result<PathBuf, PlatformError>;

    /// Whether anything, including a dangling symlink, exists at `path`
    async fn exists(&self, ctx: &PlatformContext, path: &Path) -> bool;

    async fn is_dir(&self, ctx: &PlatformContext, path: &Path) -> bool;

    /// Whether `path` resolves to a regular file with an execute bit set
    async fn is_executable(&self, ctx: &PlatformContext, path: &Path) -> bool;
}

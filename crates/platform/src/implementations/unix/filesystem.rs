//! Unix filesystem operations
//!
//! Each mutating operation is bracketed by started/completed/failed platform
//! events carrying its duration.

use async_trait::async_trait;
use keg_errors::PlatformError;
use keg_events::{AppEvent, EventEmitter, PlatformEvent};
use std::future::Future;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::{OperationTimer, PlatformContext};
use crate::filesystem::FilesystemOperations;

pub struct UnixFilesystemOperations;

impl UnixFilesystemOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnixFilesystemOperations {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `op` on `path`, emitting lifecycle events and classifying I/O errors
async fn tracked<T, F>(
    ctx: &PlatformContext,
    operation: &str,
    path: &Path,
    op: F,
) -> Result<T, PlatformError>
where
    F: Future<Output = io::Result<T>>,
{
    let target_path = path.display().to_string();
    ctx.emit(AppEvent::Platform(PlatformEvent::FilesystemOperationStarted {
        operation: operation.to_string(),
        target_path: target_path.clone(),
    }));

    let timer = OperationTimer::start();
    match op.await {
        Ok(value) => {
            ctx.emit(AppEvent::Platform(
                PlatformEvent::FilesystemOperationCompleted {
                    operation: operation.to_string(),
                    target_path,
                    duration_ms: timer.elapsed_ms(),
                },
            ));
            Ok(value)
        }
        Err(err) => {
            let error = PlatformError::from_io(operation, path, &err);
            ctx.emit(AppEvent::Platform(PlatformEvent::FilesystemOperationFailed {
                operation: operation.to_string(),
                target_path,
                error_message: error.to_string(),
                duration_ms: timer.elapsed_ms(),
            }));
            Err(error)
        }
    }
}

#[async_trait]
impl FilesystemOperations for UnixFilesystemOperations {
    async fn create_dir_all(
        &self,
        ctx: &PlatformContext,
        path: &Path,
    ) -> Result<(), PlatformError> {
        tracked(ctx, "create_dir_all", path, fs::create_dir_all(path)).await
    }

    async fn remove_dir_all(
        &self,
        ctx: &PlatformContext,
        path: &Path,
    ) -> Result<(), PlatformError> {
        tracked(ctx, "remove_dir_all", path, fs::remove_dir_all(path)).await
    }

    async fn remove_empty_dir(
        &self,
        ctx: &PlatformContext,
        path: &Path,
    ) -> Result<bool, PlatformError> {
        tracked(ctx, "remove_empty_dir", path, async {
            match fs::remove_dir(path).await {
                Ok(()) => Ok(true),
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::NotFound | io::ErrorKind::DirectoryNotEmpty
                    ) =>
                {
                    Ok(false)
                }
                Err(e) => Err(e),
            }
        })
        .await
    }

    async fn remove_file(&self, ctx: &PlatformContext, path: &Path) -> Result<(), PlatformError> {
        tracked(ctx, "remove_file", path, fs::remove_file(path)).await
    }

    async fn rename(
        &self,
        ctx: &PlatformContext,
        src: &Path,
        dst: &Path,
    ) -> Result<(), PlatformError> {
        tracing::trace!(src = %src.display(), dst = %dst.display(), "rename");
        tracked(ctx, "rename", dst, fs::rename(src, dst)).await
    }

    async fn set_permissions(
        &self,
        ctx: &PlatformContext,
        path: &Path,
        mode: u32,
    ) -> Result<(), PlatformError> {
        tracked(
            ctx,
            "set_permissions",
            path,
            fs::set_permissions(path, std::fs::Permissions::from_mode(mode)),
        )
        .await
    }

    async fn symlink(
        &self,
        ctx: &PlatformContext,
        target: &Path,
        link: &Path,
    ) -> Result<(), PlatformError> {
        tracked(ctx, "symlink", link, fs::symlink(target, link)).await
    }

    async fn read_link(
        &self,
        ctx: &PlatformContext,
        path: &Path,
    ) -> Result<PathBuf, PlatformError> {
        tracked(ctx, "read_link", path, fs::read_link(path)).await
    }

    async fn exists(&self, _ctx: &PlatformContext, path: &Path) -> bool {
        fs::symlink_metadata(path).await.is_ok()
    }

    async fn is_dir(&self, _ctx: &PlatformContext, path: &Path) -> bool {
        fs::metadata(path).await.is_ok_and(|m| m.is_dir())
    }

    async fn is_executable(&self, _ctx: &PlatformContext, path: &Path) -> bool {
        fs::metadata(path)
            .await
            .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keg_events::{channel, EventMessage};
    use tempfile::TempDir;

    fn drain(rx: &mut keg_events::EventReceiver) -> Vec<EventMessage> {
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            out.push(message);
        }
        out
    }

    #[tokio::test]
    async fn test_symlink_and_permissions() {
        let temp = TempDir::new().unwrap();
        let ops = UnixFilesystemOperations::new();
        let ctx = PlatformContext::default();

        let exe = temp.path().join("tool");
        fs::write(&exe, b"#!/bin/sh\n").await.unwrap();
        assert!(!ops.is_executable(&ctx, &exe).await);

        ops.set_permissions(&ctx, &exe, 0o555).await.unwrap();
        assert!(ops.is_executable(&ctx, &exe).await);

        let link = temp.path().join("link");
        ops.symlink(&ctx, &exe, &link).await.unwrap();
        assert_eq!(ops.read_link(&ctx, &link).await.unwrap(), exe);
        assert!(ops.is_executable(&ctx, &link).await);

        ops.set_permissions(&ctx, &exe, 0o644).await.unwrap();
        ops.remove_file(&ctx, &exe).await.unwrap();
        assert!(ops.exists(&ctx, &link).await, "dangling link still exists");
        assert!(!ops.is_executable(&ctx, &link).await);
    }

    #[tokio::test]
    async fn test_remove_empty_dir_keeps_populated_dirs() {
        let temp = TempDir::new().unwrap();
        let ops = UnixFilesystemOperations::new();
        let ctx = PlatformContext::default();

        let empty = temp.path().join("empty");
        let full = temp.path().join("full");
        ops.create_dir_all(&ctx, &empty).await.unwrap();
        ops.create_dir_all(&ctx, &full.join("inner")).await.unwrap();

        assert!(ops.remove_empty_dir(&ctx, &empty).await.unwrap());
        assert!(!ops.remove_empty_dir(&ctx, &full).await.unwrap());
        assert!(!ops.remove_empty_dir(&ctx, &empty).await.unwrap());
        assert!(ops.is_dir(&ctx, &full).await);
    }

    #[tokio::test]
    async fn test_failures_are_reported_as_events() {
        let (tx, mut rx) = channel();
        let ctx = PlatformContext::for_package(Some(tx), "demo");
        let ops = UnixFilesystemOperations::new();

        let missing = Path::new("/nonexistent/keg/file");
        let err = ops.set_permissions(&ctx, missing, 0o755).await.unwrap_err();
        assert!(matches!(err, PlatformError::FilesystemOperationFailed { .. }));

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].meta.correlation_id.as_deref(), Some("demo"));
        assert!(matches!(
            events[1].event,
            AppEvent::Platform(PlatformEvent::FilesystemOperationFailed { .. })
        ));
    }
}

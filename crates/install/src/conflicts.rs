//! Conflicting package detection

use keg_errors::InstallError;
use keg_platform::{Platform, PlatformContext};
use keg_types::{ConflictKind, InstalledLayout, PackageDescriptor};
use std::path::Path;

/// Refuse to proceed if any declared conflict is installed under `root`
///
/// Casks are looked up in `<root>/Caskroom/<name>`, formulae in
/// `<root>/Cellar/<name>`.
///
/// # Errors
///
/// Returns [`InstallError::Conflict`] naming the first conflict found.
pub async fn check_conflicts(
    platform: &Platform,
    ctx: &PlatformContext,
    root: &Path,
    descriptor: &PackageDescriptor,
) -> Result<(), InstallError> {
    for conflict in &descriptor.conflicts {
        let path = match conflict.kind {
            ConflictKind::Cask => InstalledLayout::caskroom_dir(root, &conflict.name),
            ConflictKind::Formula => InstalledLayout::package_dir(root, &conflict.name),
        };
        if platform.filesystem().is_dir(ctx, &path).await {
            tracing::debug!(%conflict, path = %path.display(), "conflicting package present");
            return Err(InstallError::Conflict {
                package: descriptor.name.clone(),
                conflicting: conflict.name.clone(),
                kind: conflict.kind.to_string(),
            });
        }
    }
    Ok(())
}

//! Keg installer: unpack, apply install steps, record, undo

use keg_errors::{Error, InstallError, UserFacingError};
use keg_events::{AppEvent, EventEmitter, FailureContext, InstallEvent, UninstallEvent};
use keg_platform::{Platform, PlatformContext};
use keg_types::{
    InstallReceipt, InstallStep, InstalledArtifact, InstalledLayout, InstalledPackage, KegDir,
    PackageDescriptor, UninstallReport,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;

use crate::conflicts::check_conflicts;
use crate::extract::extract_archive;
use crate::receipts::{cellar_packages, read_receipt, receipts_for, write_receipt};
use crate::STAGING_DIR;

/// A completed install
#[derive(Debug, Clone)]
pub struct Installation {
    pub layout: InstalledLayout,
    pub receipt: InstallReceipt,
    /// Entries moved out of the archive
    pub files_installed: usize,
    pub duration_ms: u64,
}

impl Installation {
    /// Links created in the bin directory
    #[must_use]
    pub fn linked(&self) -> Vec<PathBuf> {
        self.receipt
            .links()
            .map(|(link, _)| link.to_path_buf())
            .collect()
    }
}

/// Installs descriptors under one root
pub struct Installer<'a> {
    platform: &'a Platform,
    root: PathBuf,
    ctx: PlatformContext,
}

impl<'a> Installer<'a> {
    #[must_use]
    pub fn new(platform: &'a Platform, root: impl Into<PathBuf>, ctx: PlatformContext) -> Self {
        Self {
            platform,
            root: root.into(),
            ctx,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Install a verified archive according to `descriptor`
    ///
    /// Conflicts are checked first. An existing keg of the same version is
    /// an error unless `force` is set, in which case it is uninstalled. On
    /// failure the partially built keg and any links it created are removed.
    ///
    /// # Errors
    ///
    /// Returns `Conflict`, `AlreadyInstalled`, `ExtractionFailed`,
    /// `MissingExecutable`, `LinkExists` or `PermissionDenied` install errors,
    /// or an I/O error.
    pub async fn install(
        &self,
        descriptor: &PackageDescriptor,
        archive: &Path,
        force: bool,
    ) -> Result<Installation, Error> {
        let started = Instant::now();
        let layout = InstalledLayout::new(&self.root, &descriptor.name, &descriptor.version);

        self.ctx.emit(AppEvent::Install(InstallEvent::Started {
            package: descriptor.name.clone(),
            version: descriptor.version.clone(),
            prefix: layout.prefix.display().to_string(),
        }));

        let mut receipt = InstallReceipt::new(
            &descriptor.name,
            &descriptor.version,
            &descriptor.url,
            descriptor.checksum.digest(),
        );

        let result = match self.prepare(descriptor, &layout, force).await {
            Ok(()) => {
                let outcome = self
                    .build_keg(descriptor, archive, &layout, &mut receipt)
                    .await;
                if outcome.is_err() {
                    self.discard(&layout, &receipt).await;
                }
                outcome
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(files_installed) => {
                let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                self.ctx.emit(AppEvent::Install(InstallEvent::Completed {
                    package: descriptor.name.clone(),
                    version: descriptor.version.clone(),
                    files_installed,
                    duration_ms,
                }));
                tracing::info!(
                    package = %descriptor.name,
                    version = %descriptor.version,
                    prefix = %layout.prefix.display(),
                    "installed"
                );
                Ok(Installation {
                    layout,
                    receipt,
                    files_installed,
                    duration_ms,
                })
            }
            Err(e) => {
                self.ctx.emit(AppEvent::Install(InstallEvent::Failed {
                    package: descriptor.name.clone(),
                    version: descriptor.version.clone(),
                    failure: FailureContext::from_error(&e),
                }));
                Err(e)
            }
        }
    }

    async fn prepare(
        &self,
        descriptor: &PackageDescriptor,
        layout: &InstalledLayout,
        force: bool,
    ) -> Result<(), Error> {
        check_conflicts(self.platform, &self.ctx, &self.root, descriptor).await?;

        let fs_ops = self.platform.filesystem();
        if !fs_ops.exists(&self.ctx, &layout.prefix).await {
            return Ok(());
        }
        if !force {
            return Err(InstallError::AlreadyInstalled {
                package: descriptor.name.clone(),
                version: descriptor.version.clone(),
                path: layout.prefix.display().to_string(),
            }
            .into());
        }

        tracing::debug!(prefix = %layout.prefix.display(), "replacing existing keg");
        match read_receipt(&layout.receipt_path()).await {
            Ok(previous) => {
                self.remove_links(&previous).await?;
            }
            Err(e) => {
                self.ctx.emit_warning_with_context(
                    "existing keg has no usable receipt; its links are left in place",
                    e.user_message(),
                );
            }
        }
        fs_ops
            .remove_dir_all(&self.ctx, &layout.prefix)
            .await
            .map_err(InstallError::from)?;
        Ok(())
    }

    /// Extract and apply every install step; returns the number of entries moved
    async fn build_keg(
        &self,
        descriptor: &PackageDescriptor,
        archive: &Path,
        layout: &InstalledLayout,
        receipt: &mut InstallReceipt,
    ) -> Result<usize, Error> {
        let fs_ops = self.platform.filesystem();

        let staging_root = self.root.join(STAGING_DIR);
        fs_ops
            .create_dir_all(&self.ctx, &staging_root)
            .await
            .map_err(InstallError::from)?;
        let staging = tempfile::Builder::new()
            .prefix(&format!("{}-", descriptor.name))
            .tempdir_in(&staging_root)
            .map_err(|e| Error::io_with_path(&e, &staging_root))?;

        let contents = extract_archive(archive, staging.path()).await?;

        fs_ops
            .create_dir_all(&self.ctx, &layout.prefix)
            .await
            .map_err(InstallError::from)?;
        receipt.artifacts.push(InstalledArtifact::Keg {
            path: layout.prefix.clone(),
        });

        let mut files_installed = 0;
        for (index, step) in descriptor.install.iter().enumerate() {
            let step_number = index + 1;
            match step {
                InstallStep::CopyAll { into } => {
                    files_installed += self.move_contents(&contents, layout, *into).await?;
                }
                InstallStep::Chmod { path, mode } => {
                    let target = layout.resolve(path);
                    self.require_exists(step_number, &target).await?;
                    fs_ops
                        .set_permissions(&self.ctx, &target, mode.bits())
                        .await
                        .map_err(InstallError::from)?;
                }
                InstallStep::Symlink { target, .. } => {
                    let target_path = layout.resolve(target);
                    self.require_exists(step_number, &target_path).await?;
                    let link_name = step.link_name().unwrap_or_else(|| target.file_name());
                    let link = self
                        .link_into_bin(descriptor, layout, &link_name, &target_path)
                        .await?;
                    receipt.artifacts.push(InstalledArtifact::BinaryLink {
                        link_path: link,
                        target_path,
                    });
                }
            }
            self.ctx.emit(AppEvent::Install(InstallEvent::StepCompleted {
                package: descriptor.name.clone(),
                index: step_number,
                description: step.to_string(),
            }));
        }

        write_receipt(&layout.receipt_path(), receipt).await?;
        drop(staging);
        Ok(files_installed)
    }

    async fn move_contents(
        &self,
        contents: &Path,
        layout: &InstalledLayout,
        into: KegDir,
    ) -> Result<usize, Error> {
        let fs_ops = self.platform.filesystem();
        let dest = layout.dir(into);
        fs_ops
            .create_dir_all(&self.ctx, dest)
            .await
            .map_err(InstallError::from)?;

        let mut entries = fs::read_dir(contents)
            .await
            .map_err(|e| Error::io_with_path(&e, contents))?;
        let mut moved = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::io_with_path(&e, contents))?
        {
            let target = dest.join(entry.file_name());
            if fs_ops.exists(&self.ctx, &target).await {
                return Err(InstallError::FilesystemError {
                    operation: "copy_all".to_string(),
                    path: target.display().to_string(),
                    message: "destination already exists".to_string(),
                }
                .into());
            }
            fs_ops
                .rename(&self.ctx, &entry.path(), &target)
                .await
                .map_err(InstallError::from)?;
            moved += 1;
        }
        Ok(moved)
    }

    async fn require_exists(&self, step: usize, path: &Path) -> Result<(), InstallError> {
        if self.platform.filesystem().exists(&self.ctx, path).await {
            Ok(())
        } else {
            Err(InstallError::MissingExecutable {
                step,
                path: path.display().to_string(),
            })
        }
    }

    async fn link_into_bin(
        &self,
        descriptor: &PackageDescriptor,
        layout: &InstalledLayout,
        name: &str,
        target: &Path,
    ) -> Result<PathBuf, Error> {
        let fs_ops = self.platform.filesystem();
        fs_ops
            .create_dir_all(&self.ctx, &layout.bin)
            .await
            .map_err(InstallError::from)?;

        let link = layout.bin.join(name);
        if fs_ops.exists(&self.ctx, &link).await {
            return Err(InstallError::LinkExists {
                path: link.display().to_string(),
            }
            .into());
        }
        fs_ops
            .symlink(&self.ctx, target, &link)
            .await
            .map_err(InstallError::from)?;

        self.ctx.emit(AppEvent::Install(InstallEvent::Linked {
            package: descriptor.name.clone(),
            link: link.display().to_string(),
            target: target.display().to_string(),
        }));
        Ok(link)
    }

    /// Best-effort removal of a keg that failed to install
    async fn discard(&self, layout: &InstalledLayout, receipt: &InstallReceipt) {
        if let Err(e) = self.remove_links(receipt).await {
            tracing::warn!(error = %e, "could not remove links of failed install");
        }
        let fs_ops = self.platform.filesystem();
        if fs_ops.exists(&self.ctx, &layout.prefix).await {
            if let Err(e) = fs_ops.remove_dir_all(&self.ctx, &layout.prefix).await {
                tracing::warn!(error = %e, prefix = %layout.prefix.display(), "could not remove partial keg");
            }
        }
        if let Some(package_dir) = layout.prefix.parent() {
            let _ = fs_ops.remove_empty_dir(&self.ctx, package_dir).await;
        }
    }

    /// Remove links that still point at their recorded target
    ///
    /// Returns the removed and the skipped links.
    async fn remove_links(
        &self,
        receipt: &InstallReceipt,
    ) -> Result<(Vec<PathBuf>, Vec<PathBuf>), InstallError> {
        let fs_ops = self.platform.filesystem();
        let mut removed = Vec::new();
        let mut skipped = Vec::new();
        for (link, target) in receipt.links() {
            let points_at_keg = match fs_ops.read_link(&self.ctx, link).await {
                Ok(current) => current == target,
                Err(_) => false,
            };
            if points_at_keg {
                fs_ops.remove_file(&self.ctx, link).await?;
                removed.push(link.to_path_buf());
            } else {
                tracing::debug!(link = %link.display(), "link no longer ours, leaving it");
                skipped.push(link.to_path_buf());
            }
        }
        Ok((removed, skipped))
    }

    /// Remove an installed package and the links it created
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::NotInstalled`] if no receipt exists for `name`,
    /// or a filesystem error if removal fails.
    pub async fn uninstall(&self, name: &str) -> Result<UninstallReport, Error> {
        let result = self.uninstall_inner(name).await;
        if let Err(e) = &result {
            self.ctx.emit(AppEvent::Uninstall(UninstallEvent::Failed {
                package: name.to_string(),
                version: None,
                failure: FailureContext::from_error(e),
            }));
        }
        result
    }

    async fn uninstall_inner(&self, name: &str) -> Result<UninstallReport, Error> {
        let receipt_path = receipts_for(&self.root, name)
            .await?
            .pop()
            .ok_or_else(|| InstallError::NotInstalled {
                package: name.to_string(),
            })?;
        let receipt = read_receipt(&receipt_path).await?;
        let layout = InstalledLayout::new(&self.root, &receipt.name, &receipt.version);
        let prefix = receipt
            .keg_path()
            .map_or_else(|| layout.prefix.clone(), Path::to_path_buf);

        self.ctx.emit(AppEvent::Uninstall(UninstallEvent::Started {
            package: receipt.name.clone(),
            version: receipt.version.clone(),
        }));

        let (removed_links, skipped_links) = self.remove_links(&receipt).await?;

        let fs_ops = self.platform.filesystem();
        fs_ops
            .remove_dir_all(&self.ctx, &prefix)
            .await
            .map_err(InstallError::from)?;
        fs_ops
            .remove_empty_dir(&self.ctx, &InstalledLayout::package_dir(&self.root, name))
            .await
            .map_err(InstallError::from)?;

        self.ctx.emit(AppEvent::Uninstall(UninstallEvent::Completed {
            package: receipt.name.clone(),
            version: receipt.version.clone(),
            links_removed: removed_links.len(),
        }));

        Ok(UninstallReport {
            name: receipt.name,
            version: receipt.version,
            removed_prefix: prefix,
            removed_links,
            skipped_links,
        })
    }

    /// The installed version of `name`, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt exists but cannot be read.
    pub async fn installed_package(&self, name: &str) -> Result<Option<InstalledPackage>, Error> {
        match receipts_for(&self.root, name).await?.pop() {
            Some(path) => Ok(Some(summarize(&path, read_receipt(&path).await?))),
            None => Ok(None),
        }
    }

    /// Every package with a receipt under the cellar, sorted by name
    ///
    /// Unreadable receipts are reported as warnings and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the cellar cannot be listed.
    pub async fn installed(&self) -> Result<Vec<InstalledPackage>, Error> {
        let mut packages = Vec::new();
        for name in cellar_packages(&self.root).await? {
            for path in receipts_for(&self.root, &name).await? {
                match read_receipt(&path).await {
                    Ok(receipt) => packages.push(summarize(&path, receipt)),
                    Err(e) => self.ctx.emit_warning_with_context(
                        format!("skipping {}", path.display()),
                        e.user_message(),
                    ),
                }
            }
        }
        Ok(packages)
    }
}

fn summarize(receipt_path: &Path, receipt: InstallReceipt) -> InstalledPackage {
    let prefix = receipt
        .keg_path()
        .map(Path::to_path_buf)
        .or_else(|| receipt_path.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let links = receipt.links().map(|(link, _)| link.to_path_buf()).collect();
    InstalledPackage {
        name: receipt.name,
        version: receipt.version,
        prefix,
        installed_at: receipt.installed_at,
        links,
    }
}

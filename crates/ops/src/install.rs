//! Install, fetch and smoke-test operations

use keg_errors::{Error, InstallError};
use keg_events::{AppEvent, DownloadEvent, EventEmitter, InstallEvent};
use keg_install::{
    describe_caveats, ensure_platform, resolve_platform_gate, run_smoke_test, Installer,
};
use keg_net::VerifiedArchive;
use keg_platform::PlatformContext;
use keg_types::{FetchReport, InstallReport, InstalledLayout, PackageDescriptor, TestResult};

use crate::OpsCtx;

/// Knobs for [`install`]
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    /// Replace an existing keg of the same version
    pub force: bool,
    /// Do not run the smoke test after installing
    pub skip_test: bool,
}

/// Gate, fetch, verify, install, render caveats and smoke-test a formula
///
/// A failing smoke test is recorded in the report; the install is kept.
///
/// # Errors
///
/// Returns an error if the formula is unknown, the platform gate is closed,
/// the archive cannot be fetched or fails verification, or the install
/// itself fails.
pub async fn install(
    ctx: &OpsCtx,
    formula: &str,
    options: InstallOptions,
) -> Result<InstallReport, Error> {
    let descriptor = ctx.registry.resolve(formula).await?;
    let operation = format!("install {}", descriptor.name);
    ctx.emit_operation_started(&operation);

    match install_descriptor(ctx, &descriptor, options).await {
        Ok(report) => {
            ctx.emit_operation_completed(&operation, true);
            Ok(report)
        }
        Err(e) => {
            ctx.emit_operation_failed(&operation, &e);
            Err(e)
        }
    }
}

async fn install_descriptor(
    ctx: &OpsCtx,
    descriptor: &PackageDescriptor,
    options: InstallOptions,
) -> Result<InstallReport, Error> {
    let pctx = ctx.platform_context(&descriptor.name);

    check_gate(&pctx, ctx, descriptor)?;

    let (archive, _cached) = fetch_archive(ctx, &pctx, descriptor).await?;

    let installer = Installer::new(&ctx.platform, ctx.root(), pctx.clone());
    let installation = installer
        .install(descriptor, &archive.path, options.force)
        .await?;

    let caveats = describe_caveats(descriptor, &installation.layout);
    if let Some(text) = &caveats {
        pctx.emit(AppEvent::Install(InstallEvent::Caveats {
            package: descriptor.name.clone(),
            text: text.clone(),
        }));
    }

    let run_test =
        !options.skip_test && ctx.config.general.run_tests && !descriptor.test.is_empty();
    let test = if run_test {
        Some(run_smoke_test(&ctx.platform, &pctx, descriptor, &installation.layout).await)
    } else {
        None
    };

    Ok(InstallReport {
        name: descriptor.name.clone(),
        version: descriptor.version.clone(),
        prefix: installation.layout.prefix.clone(),
        linked: installation.linked(),
        caveats,
        test,
        duration_ms: installation.duration_ms,
    })
}

fn check_gate(
    pctx: &PlatformContext,
    ctx: &OpsCtx,
    descriptor: &PackageDescriptor,
) -> Result<(), InstallError> {
    let allowed = resolve_platform_gate(descriptor, &ctx.host);
    pctx.emit(AppEvent::Install(InstallEvent::GateChecked {
        package: descriptor.name.clone(),
        requirement: descriptor.platform.as_ref().map(ToString::to_string),
        host: ctx.host.to_string(),
        allowed,
    }));
    ensure_platform(descriptor, &ctx.host)
}

/// Download and verify a formula's archive into the cache
///
/// # Errors
///
/// Returns an error if the formula is unknown or the archive cannot be
/// fetched and verified.
pub async fn fetch(ctx: &OpsCtx, formula: &str) -> Result<FetchReport, Error> {
    let descriptor = ctx.registry.resolve(formula).await?;
    let pctx = ctx.platform_context(&descriptor.name);
    let (archive, cached) = fetch_archive(ctx, &pctx, &descriptor).await?;

    Ok(FetchReport {
        name: descriptor.name,
        url: archive.url,
        path: archive.path,
        sha256: archive.hash.to_hex(),
        size: archive.size,
        cached,
    })
}

/// Reuse a verified cached archive or download a fresh one
async fn fetch_archive(
    ctx: &OpsCtx,
    pctx: &PlatformContext,
    descriptor: &PackageDescriptor,
) -> Result<(VerifiedArchive, bool), Error> {
    let dest = ctx.config.cache_dir().join(descriptor.archive_file_name());

    if let Some(archive) =
        keg_net::find_verified(&descriptor.url, &dest, &descriptor.checksum).await?
    {
        pctx.emit(AppEvent::Download(DownloadEvent::Cached {
            url: descriptor.url.clone(),
            package: Some(descriptor.name.clone()),
            path: dest.display().to_string(),
        }));
        return Ok((archive, true));
    }

    let archive = keg_net::fetch_and_verify(
        &ctx.net,
        &descriptor.url,
        &descriptor.checksum,
        &dest,
        pctx,
        Some(&descriptor.name),
    )
    .await?;
    Ok((archive, false))
}

/// Run the smoke test of an installed formula
///
/// # Errors
///
/// Returns [`InstallError::NotInstalled`] if the formula has no keg.
pub async fn test(ctx: &OpsCtx, formula: &str) -> Result<TestResult, Error> {
    let descriptor = ctx.registry.resolve(formula).await?;
    let pctx = ctx.platform_context(&descriptor.name);
    let root = ctx.root();

    let installed = Installer::new(&ctx.platform, &root, pctx.clone())
        .installed_package(&descriptor.name)
        .await?
        .ok_or_else(|| InstallError::NotInstalled {
            package: descriptor.name.clone(),
        })?;
    if installed.version != descriptor.version {
        pctx.emit_warning(format!(
            "installed version {} differs from formula version {}",
            installed.version, descriptor.version
        ));
    }

    let layout = InstalledLayout::new(root, &descriptor.name, &installed.version);
    Ok(run_smoke_test(&ctx.platform, &pctx, &descriptor, &layout).await)
}

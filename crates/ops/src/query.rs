//! Formula information and installed-package queries

use keg_errors::Error;
use keg_install::Installer;
use keg_platform::PlatformContext;
use keg_types::{AuditReport, FormulaInfo, InstalledLayout, InstalledPackage, PackageDescriptor};

use crate::OpsCtx;

/// Rendered caveats of a formula
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CaveatsReport {
    pub name: String,
    pub text: Option<String>,
}

/// Describe a formula and whether it is installed
///
/// # Errors
///
/// Returns an error if the formula is unknown or its receipt is unreadable.
pub async fn info(ctx: &OpsCtx, formula: &str) -> Result<FormulaInfo, Error> {
    let descriptor = ctx.registry.resolve(formula).await?;
    let installed = installer(ctx, &descriptor)
        .installed_package(&descriptor.name)
        .await?;

    Ok(FormulaInfo {
        name: descriptor.name.clone(),
        version: descriptor.version.clone(),
        desc: descriptor.desc.clone(),
        homepage: descriptor.homepage.clone(),
        url: descriptor.url.clone(),
        sha256: descriptor.checksum.digest().to_string(),
        requires: descriptor.platform.as_ref().map(ToString::to_string),
        conflicts: descriptor.conflicts.iter().map(ToString::to_string).collect(),
        links: descriptor
            .install
            .iter()
            .filter_map(keg_types::InstallStep::link_name)
            .collect(),
        installed,
    })
}

/// Caveats for a formula, expanded against the layout it installs into
///
/// Works whether or not the formula is installed.
///
/// # Errors
///
/// Returns an error if the formula is unknown.
pub async fn caveats(ctx: &OpsCtx, formula: &str) -> Result<CaveatsReport, Error> {
    let descriptor = ctx.registry.resolve(formula).await?;
    let layout = InstalledLayout::new(ctx.root(), &descriptor.name, &descriptor.version);
    Ok(CaveatsReport {
        text: keg_install::describe_caveats(&descriptor, &layout),
        name: descriptor.name,
    })
}

/// Static checks on a formula
///
/// # Errors
///
/// Returns an error if the formula is unknown or does not parse.
pub async fn audit(ctx: &OpsCtx, formula: &str) -> Result<AuditReport, Error> {
    let descriptor = ctx.registry.resolve(formula).await?;
    let report = keg_install::audit(&descriptor);
    tracing::debug!(
        formula = %descriptor.name,
        problems = report.problems.len(),
        "audit finished"
    );
    Ok(report)
}

/// Every installed package
///
/// # Errors
///
/// Returns an error if the cellar cannot be listed.
pub async fn list(ctx: &OpsCtx) -> Result<Vec<InstalledPackage>, Error> {
    let pctx = PlatformContext::new(Some(ctx.tx.clone()));
    let installer = Installer::new(&ctx.platform, ctx.root(), pctx);
    installer.installed().await
}

fn installer<'a>(ctx: &'a OpsCtx, descriptor: &PackageDescriptor) -> Installer<'a> {
    Installer::new(
        &ctx.platform,
        ctx.root(),
        ctx.platform_context(&descriptor.name),
    )
}

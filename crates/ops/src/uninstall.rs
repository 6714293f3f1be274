//! Uninstall operation

use keg_errors::{Error, FormulaError};
use keg_events::EventEmitter;
use keg_install::Installer;
use keg_types::UninstallReport;

use crate::OpsCtx;

/// Remove an installed package
///
/// `formula` may name a package that is no longer in the registry; its receipt
/// is enough to undo the install.
///
/// # Errors
///
/// Returns an error if the package is not installed or removal fails.
pub async fn uninstall(ctx: &OpsCtx, formula: &str) -> Result<UninstallReport, Error> {
    let name = match ctx.registry.resolve(formula).await {
        Ok(descriptor) => descriptor.name,
        Err(Error::Formula(FormulaError::NotFound { .. })) => formula.to_string(),
        Err(e) => return Err(e),
    };

    let operation = format!("uninstall {name}");
    ctx.emit_operation_started(&operation);

    let installer = Installer::new(&ctx.platform, ctx.root(), ctx.platform_context(&name));
    match installer.uninstall(&name).await {
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

#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations orchestration for keg
//!
//! This crate serves as the orchestration layer between the CLI and the
//! library crates: it resolves formulae, checks platform gates, fetches
//! archives and drives the installer.

mod context;
mod install;
mod query;
mod registry;
mod uninstall;

pub use context::{OpsContextBuilder, OpsCtx};
pub use install::{fetch, install, test, InstallOptions};
pub use query::{audit, caveats, info, list, CaveatsReport};
pub use registry::{FormulaEntry, FormulaRegistry, FormulaSource};
pub use uninstall::uninstall;

use keg_errors::{Error, InstallError};
use keg_types::{
    AuditReport, FetchReport, FormulaInfo, InstallReport, InstalledPackage, TestResult,
    UninstallReport,
};

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    /// Installation report
    InstallReport(InstallReport),
    /// Downloaded archive
    FetchReport(FetchReport),
    /// Rendered caveats
    Caveats(CaveatsReport),
    /// Smoke test outcome
    TestResult(TestResult),
    /// Formula information
    FormulaInfo(FormulaInfo),
    /// Audit findings
    AuditReport(AuditReport),
    /// Installed packages
    PackageList(Vec<InstalledPackage>),
    /// Removal report
    UninstallReport(UninstallReport),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| {
            keg_errors::OpsError::SerializationError {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Check if this is a success result
    ///
    /// A failed smoke test or an audit with errors is not a success, even
    /// though the operation itself completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            OperationResult::InstallReport(report) => {
                report.test.as_ref().is_none_or(TestResult::passed)
            }
            OperationResult::TestResult(result) => result.passed(),
            OperationResult::AuditReport(report) => report.passed(),
            OperationResult::FetchReport(_)
            | OperationResult::Caveats(_)
            | OperationResult::FormulaInfo(_)
            | OperationResult::PackageList(_)
            | OperationResult::UninstallReport(_) => true,
        }
    }

    /// The smoke-test failure behind an unsuccessful install or test
    #[must_use]
    pub fn test_failure(&self) -> Option<InstallError> {
        let result = match self {
            OperationResult::InstallReport(report) => report.test.clone()?,
            OperationResult::TestResult(result) => result.clone(),
            _ => return None,
        };
        result.into_result().err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keg_types::InvocationOutcome;

    fn test_result(exit_code: i32) -> TestResult {
        TestResult {
            name: "powershell".to_string(),
            invocations: vec![InvocationOutcome {
                invocation: "pwsh -v".to_string(),
                exit_code: Some(exit_code),
                expected_status: 0,
                stdout: String::new(),
                stderr: String::new(),
                launch_error: None,
            }],
        }
    }

    #[test]
    fn test_failed_smoke_test_is_not_a_success() {
        let result = OperationResult::TestResult(test_result(1));
        assert!(!result.is_success());
        match result.test_failure() {
            Some(InstallError::TestFailure { invocation, status }) => {
                assert_eq!(invocation, "pwsh -v");
                assert_eq!(status, "exited with status 1");
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[test]
    fn test_passing_results_have_no_failure() {
        let result = OperationResult::TestResult(test_result(0));
        assert!(result.is_success());
        assert!(result.test_failure().is_none());

        let list = OperationResult::PackageList(Vec::new());
        assert!(list.is_success());
        assert!(list.test_failure().is_none());
    }
}

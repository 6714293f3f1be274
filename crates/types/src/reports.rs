//! Report type definitions for operations

use chrono::{DateTime, Utc};
use keg_errors::InstallError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Installation report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstallReport {
    pub name: String,
    pub version: String,
    /// Keg directory the package was installed into
    pub prefix: PathBuf,
    /// Links created in the bin directory
    pub linked: Vec<PathBuf>,
    /// Rendered caveats, if the package has any
    pub caveats: Option<String>,
    /// Smoke test outcome; `None` when the test was skipped
    pub test: Option<TestResult>,
    pub duration_ms: u64,
}

/// Result of downloading and verifying an archive
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchReport {
    pub name: String,
    pub url: String,
    pub path: PathBuf,
    /// Computed digest, equal to the declared one
    pub sha256: String,
    pub size: u64,
    /// The archive was already present and verified
    pub cached: bool,
}

/// Outcome of one smoke-test invocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationOutcome {
    pub invocation: String,
    /// Exit code; `None` if the process was terminated by a signal or
    /// never started
    pub exit_code: Option<i32>,
    pub expected_status: i32,
    pub stdout: String,
    pub stderr: String,
    /// Why the executable could not be started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_error: Option<String>,
}

impl InvocationOutcome {
    /// Outcome for an executable that could not be started at all
    #[must_use]
    pub fn not_started(invocation: String, expected_status: i32, error: String) -> Self {
        Self {
            invocation,
            exit_code: None,
            expected_status,
            stdout: String::new(),
            stderr: error.clone(),
            launch_error: Some(error),
        }
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.launch_error.is_none() && self.exit_code == Some(self.expected_status)
    }

    /// How the process ended, e.g. `exited with status 1`
    #[must_use]
    pub fn status_description(&self) -> String {
        match (&self.launch_error, self.exit_code) {
            (Some(error), _) => format!("could not be started: {error}"),
            (None, Some(code)) => format!("exited with status {code}"),
            (None, None) => "was terminated by a signal".to_string(),
        }
    }
}

/// Aggregate smoke-test result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub invocations: Vec<InvocationOutcome>,
}

impl TestResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.invocations.iter().all(InvocationOutcome::succeeded)
    }

    #[must_use]
    pub fn first_failure(&self) -> Option<&InvocationOutcome> {
        self.invocations.iter().find(|outcome| !outcome.succeeded())
    }

    /// Convert a failing result into [`InstallError::TestFailure`]
    ///
    /// # Errors
    ///
    /// Returns the first invocation that did not exit with its expected
    /// status.
    pub fn into_result(self) -> Result<Self, InstallError> {
        match self.first_failure() {
            Some(failure) => Err(InstallError::TestFailure {
                invocation: failure.invocation.clone(),
                status: failure.status_description(),
            }),
            None => Ok(self),
        }
    }
}

/// Descriptor summary shown by `info`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormulaInfo {
    pub name: String,
    pub version: String,
    pub desc: Option<String>,
    pub homepage: String,
    pub url: String,
    pub sha256: String,
    pub requires: Option<String>,
    pub conflicts: Vec<String>,
    pub links: Vec<String>,
    pub installed: Option<InstalledPackage>,
}

/// An installed keg, read back from its receipt
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    pub prefix: PathBuf,
    pub installed_at: DateTime<Utc>,
    pub links: Vec<PathBuf>,
}

/// Result of removing an installed keg
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UninstallReport {
    pub name: String,
    pub version: String,
    pub removed_prefix: PathBuf,
    pub removed_links: Vec<PathBuf>,
    /// Links that no longer pointed into the keg and were left alone
    pub skipped_links: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    Warning,
    Error,
}

impl fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditProblem {
    pub severity: AuditSeverity,
    pub message: String,
}

/// Static checks run against a descriptor
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuditReport {
    pub name: String,
    pub problems: Vec<AuditProblem>,
}

impl AuditReport {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            problems: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.problems.push(AuditProblem {
            severity: AuditSeverity::Warning,
            message: message.into(),
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.problems.push(AuditProblem {
            severity: AuditSeverity::Error,
            message: message.into(),
        });
    }

    /// No problem of error severity was found
    #[must_use]
    pub fn passed(&self) -> bool {
        self.problems
            .iter()
            .all(|problem| problem.severity < AuditSeverity::Error)
    }
}

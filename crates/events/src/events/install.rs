use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Install lifecycle of a single package
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstallEvent {
    /// The platform gate was evaluated
    GateChecked {
        package: String,
        requirement: Option<String>,
        host: String,
        allowed: bool,
    },

    Started {
        package: String,
        version: String,
        prefix: String,
    },

    /// One install step finished
    StepCompleted {
        package: String,
        index: usize,
        description: String,
    },

    Linked {
        package: String,
        link: String,
        target: String,
    },

    Completed {
        package: String,
        version: String,
        files_installed: usize,
        duration_ms: u64,
    },

    Failed {
        package: String,
        version: String,
        failure: FailureContext,
    },

    /// Post-install notes for the user
    Caveats { package: String, text: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UninstallEvent {
    Started {
        package: String,
        version: String,
    },

    Completed {
        package: String,
        version: String,
        links_removed: usize,
    },

    Failed {
        package: String,
        version: Option<String>,
        failure: FailureContext,
    },
}

use serde::{Deserialize, Serialize};

/// Smoke tests run against an installed package
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestEvent {
    Started {
        package: String,
        invocations: usize,
    },

    InvocationCompleted {
        package: String,
        invocation: String,
        exit_code: Option<i32>,
        success: bool,
    },

    Passed {
        package: String,
    },

    Failed {
        package: String,
        invocation: String,
        status: String,
    },
}

use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Archive download and verification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DownloadEvent {
    Started {
        url: String,
        package: Option<String>,
        total_bytes: Option<u64>,
    },

    /// Emitted at most once per received chunk
    Progress {
        url: String,
        bytes_downloaded: u64,
        total_bytes: Option<u64>,
    },

    Completed {
        url: String,
        package: Option<String>,
        bytes_downloaded: u64,
    },

    /// The computed digest matched the declared one
    Verified {
        url: String,
        package: Option<String>,
        sha256: String,
    },

    /// A previously downloaded archive was reused after verification
    Cached {
        url: String,
        package: Option<String>,
        path: String,
    },

    Failed {
        url: String,
        package: Option<String>,
        failure: FailureContext,
    },
}

#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the keg installer
//!
//! This crate provides the package descriptor data model and the
//! fundamental types shared by the other crates: OS versions, checksums,
//! install layouts, receipts and operation reports.

pub mod checksum;
pub mod formula;
pub mod layout;
pub mod os;
pub mod receipt;
pub mod reports;

// Re-export commonly used types
pub use checksum::{Checksum, ChecksumAlgorithm};
pub use formula::{
    infer_version, Bottle, Conflict, ConflictKind, FileMode, InstallStep, KegDir, KegPath,
    PackageDescriptor, PlatformRequirement, TestStep,
};
pub use layout::InstalledLayout;
pub use os::{HostPlatform, OsFamily, OsVersion};
pub use receipt::{InstallReceipt, InstalledArtifact, RECEIPT_FILE};
pub use reports::{
    AuditProblem, AuditReport, AuditSeverity, FetchReport, FormulaInfo, InstallReport,
    InstalledPackage, InvocationOutcome, TestResult, UninstallReport,
};

use serde::{Deserialize, Serialize};

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    #[default]
    Tty,
    Json,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    #[default]
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}

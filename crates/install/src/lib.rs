#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package installation for keg
//!
//! This crate evaluates platform gates, checks for conflicting packages,
//! unpacks verified archives into a versioned keg, applies a descriptor's
//! install steps, renders caveats and runs smoke tests. Each install writes
//! a receipt that `uninstall` later uses to undo it.

mod audit;
mod caveats;
mod conflicts;
mod extract;
mod gate;
mod installer;
mod receipts;
mod smoke;

pub use audit::audit;
pub use caveats::describe_caveats;
pub use conflicts::check_conflicts;
pub use extract::extract_archive;
pub use gate::{ensure_platform, resolve_platform_gate};
pub use installer::{Installation, Installer};
pub use receipts::{read_receipt, write_receipt};
pub use smoke::run_smoke_test;

/// Directory under the install root that holds in-progress extractions
pub const STAGING_DIR: &str = ".staging";

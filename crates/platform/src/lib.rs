#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform abstraction layer for install operations
//!
//! This crate provides a unified interface for:
//! - Filesystem operations (permissions, symlinks, moves)
//! - Process execution for smoke tests and host probing
//! - Host OS detection for platform gates
//!
//! Every operation takes a [`PlatformContext`] and reports itself through the
//! event channel it carries.

pub mod core;
pub mod filesystem;
pub mod host;
pub mod implementations;
pub mod process;

pub use crate::core::{Platform, PlatformContext};
pub use filesystem::FilesystemOperations;
pub use host::{detect_host, parse_product_version};
pub use implementations::unix::UnixPlatform;
pub use process::{CommandOutput, PlatformCommand, ProcessOperations};

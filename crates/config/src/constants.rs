//! Default locations under the install root
//!
//! Only the root itself is configurable; everything else is derived from it
//! unless overridden in `[paths]`.

pub const DEFAULT_ROOT: &str = "/opt/keg";

/// Descriptor files, relative to the root
pub const FORMULA_SUBDIR: &str = "Formula";

/// Downloaded archives, relative to the root
pub const CACHE_SUBDIR: &str = "var/cache";

/// Debug logs, relative to the root
pub const LOGS_SUBDIR: &str = "var/log";

pub const CONFIG_FILE: &str = "config.toml";

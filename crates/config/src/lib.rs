#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for keg
//!
//! Values are layered, later sources winning:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/keg/config.toml, or `--config`)
//! - `KEG_*` environment variables
//! - CLI flags, applied by the binary

pub mod constants;

use keg_errors::{ConfigError, Error};
use keg_types::{ColorChoice, OsVersion, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub platform: PlatformConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
    /// Run the smoke test after every install
    #[serde(default = "default_run_tests")]
    pub run_tests: bool,
}

/// Path overrides; unset paths are derived from `root`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    pub root: Option<PathBuf>,
    pub formula_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub logs_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlatformConfig {
    /// Pretend to run on this OS version instead of asking the host
    pub os_version: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
            color: ColorChoice::Auto,
            run_tests: true,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_run_tests() -> bool {
    true
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("keg/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("keg").join(constants::CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or has unknown keys.
    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or parsed.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if fs::try_exists(&config_path).await.unwrap_or(false) {
            tracing::debug!(path = %config_path.display(), "loading configuration");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit path, or fall back to [`Config::load`]
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with `KEG_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value that cannot be parsed.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Merge variables supplied by `lookup`
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value that cannot be parsed.
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(output) = lookup("KEG_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => return Err(invalid("KEG_OUTPUT", output)),
            };
        }

        if let Some(color) = lookup("KEG_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => return Err(invalid("KEG_COLOR", color)),
            };
        }

        if let Some(root) = lookup("KEG_ROOT") {
            if root.is_empty() {
                return Err(invalid("KEG_ROOT", root));
            }
            self.paths.root = Some(PathBuf::from(root));
        }

        if let Some(dir) = lookup("KEG_FORMULA_DIR") {
            self.paths.formula_dir = Some(PathBuf::from(dir));
        }

        if let Some(version) = lookup("KEG_OS_VERSION") {
            if version.parse::<OsVersion>().is_err() {
                return Err(invalid("KEG_OS_VERSION", version));
            }
            self.platform.os_version = Some(version);
        }

        if let Some(timeout) = lookup("KEG_TIMEOUT") {
            self.network.timeout = timeout
                .parse()
                .map_err(|_| invalid("KEG_TIMEOUT", timeout.clone()))?;
        }

        Ok(())
    }

    /// Install root (`/opt/keg` unless overridden)
    #[must_use]
    pub fn root(&self) -> PathBuf {
        self.paths
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_ROOT))
    }

    #[must_use]
    pub fn formula_dir(&self) -> PathBuf {
        self.paths
            .formula_dir
            .clone()
            .unwrap_or_else(|| self.root().join(constants::FORMULA_SUBDIR))
    }

    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.paths
            .cache_dir
            .clone()
            .unwrap_or_else(|| self.root().join(constants::CACHE_SUBDIR))
    }

    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.paths
            .logs_dir
            .clone()
            .unwrap_or_else(|| self.root().join(constants::LOGS_SUBDIR))
    }

    /// OS version override for platform gates
    ///
    /// # Errors
    ///
    /// Returns an error if the configured value is not a version or release name.
    pub fn os_version_override(&self) -> Result<Option<OsVersion>, Error> {
        self.platform
            .os_version
            .as_deref()
            .map(|value| {
                value
                    .parse()
                    .map_err(|_| invalid("platform.os_version", value.to_string()))
            })
            .transpose()
    }
}

fn invalid(field: &str, value: String) -> Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value,
    }
    .into()
}

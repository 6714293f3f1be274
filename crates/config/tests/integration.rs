//! Integration tests for config

use keg_config::*;
use keg_types::{ColorChoice, OsVersion, OutputFormat};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(
        temp_file,
        r#"
[general]
default_output = "plain"
color = "never"
run_tests = false

[paths]
root = "/tmp/keg-test"
formula_dir = "/tmp/formulae"

[network]
timeout = 60

[platform]
os_version = "10.14"
"#
    )
    .unwrap();

    let config = Config::load_from_file(temp_file.path()).await.unwrap();
    assert_eq!(config.general.default_output, OutputFormat::Plain);
    assert_eq!(config.general.color, ColorChoice::Never);
    assert!(!config.general.run_tests);
    assert_eq!(config.root(), PathBuf::from("/tmp/keg-test"));
    assert_eq!(config.formula_dir(), PathBuf::from("/tmp/formulae"));
    assert_eq!(config.network.timeout, 60);
    assert_eq!(config.network.connect_timeout, 30);
    assert_eq!(
        config.os_version_override().unwrap(),
        Some(OsVersion::new(10, 14, 0))
    );
}

#[tokio::test]
async fn test_partial_file_keeps_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "[network]\nconnect_timeout = 5").unwrap();

    let config = Config::load_from_file(temp_file.path()).await.unwrap();
    assert_eq!(config.network.connect_timeout, 5);
    assert_eq!(config.network.timeout, 300);
    assert!(config.general.run_tests);
    assert_eq!(config.root(), PathBuf::from(constants::DEFAULT_ROOT));
}

#[tokio::test]
async fn test_missing_file_is_an_error() {
    let result = Config::load_or_default(Some(std::path::Path::new(
        "/nonexistent/keg/config.toml",
    )))
    .await;
    assert!(result.is_err());
}

#[test]
fn test_unknown_section_is_rejected() {
    assert!(Config::from_toml_str("[build]\njobs = 4\n").is_err());
}

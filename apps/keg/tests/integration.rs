//! Integration tests for the keg CLI

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn keg(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_keg"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("KEG_ROOT")
        .env_remove("KEG_FORMULA_DIR")
        .env_remove("KEG_OUTPUT")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute keg")
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_keg"))
        .arg("--version")
        .output()
        .expect("Failed to execute keg");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("keg"));
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_keg"))
        .arg("--help")
        .output()
        .expect("Failed to execute keg");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["install", "fetch", "caveats", "test", "info", "audit", "list", "uninstall"] {
        assert!(stdout.contains(command), "missing {command}");
    }
}

#[test]
fn test_cli_invalid_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_keg"))
        .arg("invalid-command")
        .output()
        .expect("Failed to execute keg");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn test_install_requires_formula() {
    let output = Command::new(env!("CARGO_BIN_EXE_keg"))
        .arg("install")
        .output()
        .expect("Failed to execute keg");

    assert!(!output.status.success());
}

#[test]
fn test_caveats_of_builtin_formula() {
    let temp = TempDir::new().unwrap();
    let output = keg(temp.path(), &["--color", "never", "caveats", "powershell"]);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let bin = temp.path().join("bin/pwsh");
    let libexec = temp.path().join("Cellar/powershell/7.0.0/libexec");
    assert!(stdout.contains(&bin.display().to_string()), "{stdout}");
    assert!(stdout.contains(&libexec.display().to_string()), "{stdout}");
}

#[test]
fn test_json_list_on_empty_root() {
    let temp = TempDir::new().unwrap();
    let output = keg(temp.path(), &["--json", "list"]);

    assert!(output.status.success(), "{output:?}");
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["type"], "PackageList");
    assert_eq!(json["data"], serde_json::json!([]));
}

#[test]
fn test_unknown_formula_fails_with_code() {
    let temp = TempDir::new().unwrap();
    let output = keg(temp.path(), &["--json", "info", "no-such-formula"]);

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["type"], "Error");
    assert_eq!(json["data"]["code"], "formula.not_found");
}

#[test]
fn test_uninstall_of_missing_package_fails() {
    let temp = TempDir::new().unwrap();
    let output = keg(temp.path(), &["uninstall", "powershell"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "{stderr}");
}

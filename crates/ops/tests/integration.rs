//! Integration tests for ops crate

use flate2::write::GzEncoder;
use flate2::Compression;
use keg_config::Config;
use keg_errors::{Error, InstallError, NetworkError};
use keg_events::{channel, AppEvent, EventReceiver, InstallEvent};
use keg_hash::Hash;
use keg_net::NetClient;
use keg_ops::{
    caveats, fetch, info, install, list, uninstall, FormulaRegistry, FormulaSource,
    InstallOptions, OperationResult, OpsContextBuilder, OpsCtx,
};
use keg_types::{HostPlatform, OsVersion};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PWSH: &[u8] = b"#!/bin/sh
case \"$1\" in
  -v) echo \"PowerShell 7.0.0\" ;;
  -c) echo \"7.0.0\" ;;
  *) exit 2 ;;
esac
";

struct Fixture {
    _temp: TempDir,
    root: PathBuf,
    rx: EventReceiver,
    ctx: OpsCtx,
}

fn archive_bytes(pwsh: &[u8]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    let mut header = tar::Header::new_gnu();
    header.set_size(pwsh.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, "pwsh", pwsh).unwrap();
    builder.into_inner().unwrap().finish().unwrap()
}

fn formula(url: &str, sha256: &str) -> String {
    format!(
        r#"
name = "powershell"
desc = "PowerShell"
homepage = "https://github.com/powershell/powershell"
url = "{url}"
version = "7.0.0"
sha256 = "{sha256}"
caveats = """
Run {{bin}}/pwsh; other files are in {{libexec}}
"""

[depends_on]
macos = "high_sierra"

[[conflicts_with]]
cask = "powershell"

[[install]]
action = "copy_all"
into = "libexec"

[[install]]
action = "chmod"
path = "libexec/pwsh"
mode = "0555"

[[install]]
action = "symlink"
target = "libexec/pwsh"

[[test]]
exe = "bin/pwsh"
args = ["-v"]

[[test]]
exe = "bin/pwsh"
args = ["-c", "$psversiontable.psversion.tostring()"]
"#
    )
}

async fn fixture(host: OsVersion, declared_sha: Option<&str>) -> Fixture {
    fixture_with_payload(host, declared_sha, PWSH).await
}

async fn fixture_with_payload(host: OsVersion, declared_sha: Option<&str>, pwsh: &[u8]) -> Fixture {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("root");
    let formula_dir = temp.path().join("Formula");
    std::fs::create_dir_all(&formula_dir).unwrap();

    let bytes = archive_bytes(pwsh);
    let archive = temp.path().join("powershell-7.0.0-osx-x64.tar.gz");
    std::fs::write(&archive, &bytes).unwrap();
    let url = url::Url::from_file_path(&archive).unwrap().to_string();
    let sha = declared_sha.map_or_else(|| Hash::from_data(&bytes).to_hex(), str::to_string);
    std::fs::write(formula_dir.join("powershell.toml"), formula(&url, &sha)).unwrap();

    let mut config = Config::default();
    config.paths.root = Some(root.clone());
    config.paths.formula_dir = Some(formula_dir.clone());

    let (tx, rx) = channel();
    let ctx = OpsContextBuilder::new()
        .with_registry(FormulaRegistry::load(&formula_dir).await.unwrap())
        .with_net(NetClient::with_defaults().unwrap())
        .with_host(HostPlatform::macos(host))
        .with_event_sender(tx)
        .with_config(config)
        .build()
        .unwrap();

    Fixture {
        _temp: temp,
        root,
        rx,
        ctx,
    }
}

fn install_events(rx: &mut EventReceiver) -> Vec<InstallEvent> {
    let mut out = Vec::new();
    while let Ok(message) = rx.try_recv() {
        if let AppEvent::Install(event) = message.event {
            out.push(event);
        }
    }
    out
}

fn cellar_is_empty(root: &Path) -> bool {
    !root.join("Cellar").exists()
}

#[tokio::test]
async fn test_install_on_supported_host() {
    let mut fx = fixture(OsVersion::new(10, 14, 0), None).await;
    assert!(matches!(
        fx.ctx.registry.get("powershell").unwrap().source,
        FormulaSource::File(_)
    ));

    let report = install(&fx.ctx, "powershell", InstallOptions::default())
        .await
        .unwrap();

    let bin = fx.root.join("bin");
    let libexec = fx.root.join("Cellar/powershell/7.0.0/libexec");
    assert_eq!(report.prefix, fx.root.join("Cellar/powershell/7.0.0"));
    assert_eq!(report.linked, vec![bin.join("pwsh")]);

    let text = report.caveats.clone().unwrap();
    assert!(text.contains(&format!("{}/pwsh", bin.display())), "{text}");
    assert!(text.contains(&libexec.display().to_string()), "{text}");

    let test = report.test.clone().unwrap();
    assert!(test.passed(), "{test:?}");
    assert!(OperationResult::InstallReport(report).is_success());

    let events = install_events(&mut fx.rx);
    assert!(matches!(
        events.first(),
        Some(InstallEvent::GateChecked { allowed: true, .. })
    ));
    assert!(events
        .iter()
        .any(|e| matches!(e, InstallEvent::Caveats { .. })));

    let installed = list(&fx.ctx).await.unwrap();
    assert_eq!(installed.len(), 1);

    let described = info(&fx.ctx, "powershell").await.unwrap();
    assert_eq!(described.links, vec!["pwsh".to_string()]);
    assert_eq!(described.installed.unwrap().version, "7.0.0");

    let removed = uninstall(&fx.ctx, "powershell").await.unwrap();
    assert_eq!(removed.removed_links, vec![bin.join("pwsh")]);
    assert!(list(&fx.ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unrunnable_executable_fails_the_install() {
    let fx = fixture_with_payload(
        OsVersion::new(10, 14, 0),
        None,
        b"\x7fELF garbage not runnable",
    )
    .await;

    let report = install(&fx.ctx, "powershell", InstallOptions::default())
        .await
        .unwrap();

    let test = report.test.clone().expect("smoke test ran");
    assert_eq!(test.invocations.len(), 2, "every invocation is reported");
    let failure = test.first_failure().unwrap();
    assert_eq!(failure.invocation, "pwsh -v");
    assert!(matches!(
        test.clone().into_result(),
        Err(InstallError::TestFailure { invocation, .. }) if invocation == "pwsh -v"
    ));
    assert!(!OperationResult::InstallReport(report).is_success());
    assert!(fx.root.join("Cellar/powershell/7.0.0/libexec/pwsh").exists());
}

#[tokio::test]
async fn test_old_host_is_refused_before_download() {
    let mut fx = fixture(OsVersion::new(10, 12, 0), None).await;

    let err = install(&fx.ctx, "powershell", InstallOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Install(InstallError::PlatformUnsupported { .. })
    ));
    assert!(!fx.ctx.config.cache_dir().exists(), "nothing was downloaded");
    assert!(cellar_is_empty(&fx.root));

    let events = install_events(&mut fx.rx);
    assert!(matches!(
        events.as_slice(),
        [InstallEvent::GateChecked { allowed: false, .. }]
    ));
}

#[tokio::test]
async fn test_checksum_mismatch_never_installs() {
    let wrong = "0000000000000000000000000000000000000000000000000000000000000000";
    let fx = fixture(OsVersion::new(10, 14, 0), Some(wrong)).await;

    let err = install(&fx.ctx, "powershell", InstallOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Network(NetworkError::ChecksumMismatch { .. })
    ));
    assert!(cellar_is_empty(&fx.root));
}

#[tokio::test]
async fn test_fetch_reuses_verified_cache() {
    let fx = fixture(OsVersion::new(10, 14, 0), None).await;

    let first = fetch(&fx.ctx, "powershell").await.unwrap();
    assert!(!first.cached);
    assert!(first.path.starts_with(fx.ctx.config.cache_dir()));

    let second = fetch(&fx.ctx, "powershell").await.unwrap();
    assert!(second.cached);
    assert_eq!(second.sha256, first.sha256);
}

#[tokio::test]
async fn test_caveats_without_install() {
    let fx = fixture(OsVersion::new(10, 14, 0), None).await;
    let report = caveats(&fx.ctx, "powershell").await.unwrap();
    assert_eq!(
        report.text.unwrap(),
        format!(
            "Run {}/pwsh; other files are in {}",
            fx.root.join("bin").display(),
            fx.root.join("Cellar/powershell/7.0.0/libexec").display()
        )
    );
}

#[tokio::test]
async fn test_operation_result_json_shape() {
    let fx = fixture(OsVersion::new(10, 14, 0), None).await;
    let result = OperationResult::Caveats(caveats(&fx.ctx, "powershell").await.unwrap());
    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
    assert_eq!(json["type"], "Caveats");
    assert_eq!(json["data"]["name"], "powershell");
}

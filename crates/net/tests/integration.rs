//! Integration tests for net crate

use httpmock::prelude::*;
use keg_errors::{Error, NetworkError};
use keg_events::{channel, AppEvent, DownloadEvent, EventReceiver};
use keg_hash::Hash;
use keg_net::{fetch_and_verify, find_verified, NetClient};
use keg_types::Checksum;
use tempfile::tempdir;

const ARCHIVE: &[u8] = b"not really a tarball, but bytes are bytes";

fn checksum_of(data: &[u8]) -> Checksum {
    Checksum::sha256(&Hash::from_data(data).to_hex()).unwrap()
}

fn drain(rx: &mut EventReceiver) -> Vec<DownloadEvent> {
    let mut out = Vec::new();
    while let Ok(message) = rx.try_recv() {
        if let AppEvent::Download(event) = message.event {
            out.push(event);
        }
    }
    out
}

#[tokio::test]
async fn test_fetch_and_verify_over_http() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/pwsh-7.0.0.tar.gz");
            then.status(200).body(ARCHIVE);
        })
        .await;

    let temp = tempdir().unwrap();
    let dest = temp.path().join("cache").join("pwsh-7.0.0.tar.gz");
    let client = NetClient::with_defaults().unwrap();
    let (tx, mut rx) = channel();

    let archive = fetch_and_verify(
        &client,
        &server.url("/pwsh-7.0.0.tar.gz"),
        &checksum_of(ARCHIVE),
        &dest,
        &tx,
        Some("powershell"),
    )
    .await
    .unwrap();

    mock.assert_async().await;
    assert_eq!(archive.path, dest);
    assert_eq!(archive.size, ARCHIVE.len() as u64);
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), ARCHIVE);

    let events = drain(&mut rx);
    assert!(matches!(events.first(), Some(DownloadEvent::Started { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, DownloadEvent::Completed { bytes_downloaded, .. } if *bytes_downloaded == ARCHIVE.len() as u64)));
    assert!(matches!(
        events.last(),
        Some(DownloadEvent::Verified { package: Some(p), .. }) if p == "powershell"
    ));
}

#[tokio::test]
async fn test_checksum_mismatch_leaves_nothing_behind() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/tampered.tar.gz");
            then.status(200).body(b"tampered bytes");
        })
        .await;

    let temp = tempdir().unwrap();
    let dest = temp.path().join("tampered.tar.gz");
    let client = NetClient::with_defaults().unwrap();
    let (tx, mut rx) = channel();
    let expected = checksum_of(ARCHIVE);

    let err = fetch_and_verify(
        &client,
        &server.url("/tampered.tar.gz"),
        &expected,
        &dest,
        &tx,
        None,
    )
    .await
    .unwrap_err();

    match err {
        Error::Network(NetworkError::ChecksumMismatch {
            expected: want,
            actual,
            ..
        }) => {
            assert_eq!(want, expected.digest());
            assert_eq!(actual, Hash::from_data(b"tampered bytes").to_hex());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!dest.exists());
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);

    let events = drain(&mut rx);
    assert!(matches!(
        events.last(),
        Some(DownloadEvent::Failed { failure, .. }) if failure.code.as_deref() == Some("network.checksum_mismatch")
    ));
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing.tar.gz");
            then.status(404);
        })
        .await;

    let temp = tempdir().unwrap();
    let dest = temp.path().join("missing.tar.gz");
    let client = NetClient::with_defaults().unwrap();
    let (tx, _rx) = channel();

    let err = fetch_and_verify(
        &client,
        &server.url("/missing.tar.gz"),
        &checksum_of(ARCHIVE),
        &dest,
        &tx,
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        Error::Network(NetworkError::HttpError { status: 404, .. })
    ));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_file_url_and_cache_reuse() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("source.tar.gz");
    std::fs::write(&source, ARCHIVE).unwrap();
    let url = url::Url::from_file_path(&source).unwrap().to_string();

    let dest = temp.path().join("cache").join("archive.tar.gz");
    let client = NetClient::with_defaults().unwrap();
    let (tx, _rx) = channel();
    let expected = checksum_of(ARCHIVE);

    assert!(find_verified(&url, &dest, &expected).await.unwrap().is_none());

    let archive = fetch_and_verify(&client, &url, &expected, &dest, &tx, None)
        .await
        .unwrap();
    assert_eq!(archive.size, ARCHIVE.len() as u64);

    let cached = find_verified(&url, &dest, &expected).await.unwrap().unwrap();
    assert_eq!(cached.hash, archive.hash);

    let other = checksum_of(b"a different release");
    assert!(find_verified(&url, &dest, &other).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unsupported_scheme() {
    let temp = tempdir().unwrap();
    let client = NetClient::with_defaults().unwrap();
    let (tx, _rx) = channel();

    let err = fetch_and_verify(
        &client,
        "ftp://example.com/pwsh.tar.gz",
        &checksum_of(ARCHIVE),
        &temp.path().join("pwsh.tar.gz"),
        &tx,
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        Error::Network(NetworkError::UnsupportedProtocol { ref protocol }) if protocol == "ftp"
    ));
}

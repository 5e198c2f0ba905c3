//! End-to-end runs of the upgrade routine against a mock release server.

use spicetify::core::UpgradeError;
use spicetify::test_utils::FakeExtractor;
use spicetify::upgrade::config::UpgradeConfig;
use spicetify::upgrade::platform::Platform;
use spicetify::upgrade::{UpgradeOutcome, Upgrader};
use wiremock::Mock;
use wiremock::ResponseTemplate;
use wiremock::matchers::{header, method, path};

use crate::common::{Install, LATEST_PATH, RecordingProgress, ReleaseServer};

fn upgrader(server: &ReleaseServer, install: &Install, extractor: FakeExtractor) -> Upgrader<FakeExtractor> {
    Upgrader::for_platform(server.config(), "1.0.0", Platform::Linux)
        .unwrap()
        .with_executable(&install.exe)
        .with_download_dir(&install.download_dir)
        .with_extractor(extractor)
}

#[tokio::test]
async fn test_resolves_latest_tag_without_prefix() {
    spicetify::test_utils::init_test_logging(None);
    let server = ReleaseServer::start().await;

    Mock::given(method("GET"))
        .and(path(LATEST_PATH))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("user-agent", "spicetify/1.0.0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "tag_name": "v9.9.9" })),
        )
        .expect(1)
        .mount(&server.server)
        .await;

    let install = Install::new(b"old binary");
    let upgrader = upgrader(&server, &install, FakeExtractor::failing());

    assert_eq!(upgrader.fetch_latest().await.unwrap(), "9.9.9");
}

#[tokio::test]
async fn test_equal_versions_skip_download() {
    let server = ReleaseServer::start().await;
    server.mount_latest("v1.0.0").await;
    server.mount_linux_artifact("1.0.0", 200, b"unused".to_vec(), 0).await;

    let install = Install::new(b"old binary");
    let extractor = FakeExtractor::writing("spicetify", b"new binary");
    let upgrader = upgrader(&server, &install, extractor.clone());
    let progress = RecordingProgress::default();

    let outcome = upgrader.run(&progress).await.unwrap();

    assert_eq!(
        outcome,
        UpgradeOutcome::UpToDate {
            version: "1.0.0".to_string()
        }
    );
    assert_eq!(install.read_exe(), b"old binary");
    assert!(!install.backup().exists());
    assert_eq!(extractor.calls(), 0);
    assert_eq!(
        progress.events(),
        vec![
            "step:Fetch latest release info",
            "ok",
            "info:Current version: 1.0.0",
            "info:Latest release: 1.0.0",
        ]
    );
}

#[tokio::test]
async fn test_full_upgrade_replaces_executable() {
    let server = ReleaseServer::start().await;
    server.mount_latest("v9.9.9").await;
    server.mount_linux_artifact("9.9.9", 200, b"archive bytes".to_vec(), 1).await;

    let install = Install::new(b"old binary");
    let extractor = FakeExtractor::writing("spicetify", b"new binary");
    let upgrader = upgrader(&server, &install, extractor.clone());
    let progress = RecordingProgress::default();

    let outcome = upgrader.run(&progress).await.unwrap();

    assert_eq!(
        outcome,
        UpgradeOutcome::Upgraded {
            from: "1.0.0".to_string(),
            to: "9.9.9".to_string()
        }
    );
    assert_eq!(install.read_exe(), b"new binary");
    assert!(!install.backup().exists());
    assert!(!install.archive("9.9.9").exists());
    assert_eq!(
        extractor.invocations(),
        vec![(install.archive("9.9.9"), install.bin_dir.clone())]
    );
    assert_eq!(
        progress.events(),
        vec![
            "step:Fetch latest release info",
            "ok",
            "info:Current version: 1.0.0",
            "info:Latest release: 9.9.9",
            "step:Downloading",
            "ok",
            "step:Extracting",
            "ok",
        ]
    );
}

#[tokio::test]
async fn test_stale_backup_from_previous_run_is_replaced() {
    let server = ReleaseServer::start().await;
    server.mount_latest("v9.9.9").await;
    server.mount_linux_artifact("9.9.9", 200, b"archive bytes".to_vec(), 1).await;

    let install = Install::new(b"old binary");
    std::fs::write(install.backup(), b"stale").unwrap();
    let upgrader = upgrader(&server, &install, FakeExtractor::writing("spicetify", b"new binary"));

    upgrader.run(&RecordingProgress::default()).await.unwrap();

    assert_eq!(install.read_exe(), b"new binary");
    assert!(!install.backup().exists());
}

#[tokio::test]
async fn test_extraction_failure_keeps_backup() {
    let server = ReleaseServer::start().await;
    server.mount_latest("v9.9.9").await;
    server.mount_linux_artifact("9.9.9", 200, b"archive bytes".to_vec(), 1).await;

    let install = Install::new(b"old binary");
    let upgrader = upgrader(&server, &install, FakeExtractor::failing());
    let progress = RecordingProgress::default();

    let err = upgrader.run(&progress).await.unwrap_err();

    assert!(matches!(err, UpgradeError::Extract { ref backup, .. } if *backup == install.backup()));
    assert!(!err.is_recoverable());
    assert!(!install.exe.exists());
    assert_eq!(std::fs::read(install.backup()).unwrap(), b"old binary");
    assert_eq!(progress.events().last().map(String::as_str), Some("step:Extracting"));
}

#[tokio::test]
async fn test_missing_artifact_aborts_before_touching_executable() {
    let server = ReleaseServer::start().await;
    server.mount_latest("v9.9.9").await;
    server.mount_linux_artifact("9.9.9", 404, b"Not Found".to_vec(), 1).await;

    let install = Install::new(b"old binary");
    let extractor = FakeExtractor::writing("spicetify", b"new binary");
    let upgrader = upgrader(&server, &install, extractor.clone());

    let err = upgrader.run(&RecordingProgress::default()).await.unwrap_err();

    assert!(matches!(err, UpgradeError::DownloadStatus { status: 404, .. }));
    assert!(!err.is_recoverable());
    assert_eq!(install.read_exe(), b"old binary");
    assert!(!install.backup().exists());
    assert!(!install.archive("9.9.9").exists());
    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn test_rename_failure_removes_downloaded_archive() {
    let server = ReleaseServer::start().await;
    server.mount_latest("v9.9.9").await;
    server.mount_linux_artifact("9.9.9", 200, b"archive bytes".to_vec(), 1).await;

    let install = Install::new(b"old binary");
    std::fs::remove_file(&install.exe).unwrap();
    let extractor = FakeExtractor::writing("spicetify", b"new binary");
    let upgrader = upgrader(&server, &install, extractor.clone());

    let err = upgrader.run(&RecordingProgress::default()).await.unwrap_err();

    assert!(matches!(err, UpgradeError::Rename { .. }));
    assert!(!install.archive("9.9.9").exists());
    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn test_release_server_error_is_recoverable() {
    let server = ReleaseServer::start().await;
    server.mount_latest_response(500, "boom").await;
    server.mount_linux_artifact("9.9.9", 200, Vec::new(), 0).await;

    let install = Install::new(b"old binary");
    let upgrader = upgrader(&server, &install, FakeExtractor::failing());
    let progress = RecordingProgress::default();

    let err = upgrader.run(&progress).await.unwrap_err();

    assert!(matches!(err, UpgradeError::ReleaseStatus { status: 500, .. }));
    assert!(err.is_recoverable());
    assert_eq!(progress.events(), vec!["step:Fetch latest release info"]);
    assert_eq!(install.read_exe(), b"old binary");
}

#[tokio::test]
async fn test_malformed_release_body_is_recoverable() {
    let server = ReleaseServer::start().await;
    server.mount_latest_response(200, "<html>rate limited</html>").await;

    let install = Install::new(b"old binary");
    let upgrader = upgrader(&server, &install, FakeExtractor::failing());

    let err = upgrader.run(&RecordingProgress::default()).await.unwrap_err();

    assert!(matches!(err, UpgradeError::ReleaseDecode(_)));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_bare_prefix_tag_is_rejected() {
    let server = ReleaseServer::start().await;
    server.mount_latest("v").await;

    let install = Install::new(b"old binary");
    let upgrader = upgrader(&server, &install, FakeExtractor::failing());

    let err = upgrader.fetch_latest().await.unwrap_err();

    assert!(matches!(err, UpgradeError::EmptyTag));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_unreachable_server_is_recoverable() {
    let config = UpgradeConfig {
        api_base: "http://127.0.0.1:1".to_string(),
        ..UpgradeConfig::default()
    };

    let install = Install::new(b"old binary");
    let upgrader = Upgrader::for_platform(config, "1.0.0", Platform::Linux)
        .unwrap()
        .with_executable(&install.exe)
        .with_extractor(FakeExtractor::failing());

    let err = upgrader.run(&RecordingProgress::default()).await.unwrap_err();

    assert!(matches!(err, UpgradeError::ReleaseRequest { .. }));
    assert!(err.is_recoverable());
    assert_eq!(install.read_exe(), b"old binary");
}

#[cfg(unix)]
#[tokio::test]
async fn test_real_tarball_is_extracted_over_executable() {
    let server = ReleaseServer::start().await;
    let install = Install::new(b"old binary");
    let fixture_dir = tempfile::TempDir::new().unwrap();
    let archive = crate::common::tarball(fixture_dir.path(), b"#!/bin/sh\necho 9.9.9\n");

    server.mount_latest("v9.9.9").await;
    server.mount_linux_artifact("9.9.9", 200, archive, 1).await;

    let upgrader = Upgrader::for_platform(server.config(), "1.0.0", Platform::Linux)
        .unwrap()
        .with_executable(&install.exe)
        .with_download_dir(&install.download_dir);

    upgrader.run(&RecordingProgress::default()).await.unwrap();

    assert_eq!(install.read_exe(), b"#!/bin/sh\necho 9.9.9\n");
    assert!(!install.backup().exists());
    assert!(!install.archive("9.9.9").exists());
}

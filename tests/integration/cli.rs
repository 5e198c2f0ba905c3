//! Tests of the compiled `spicetify` binary.

use assert_cmd::Command;
use assert_cmd::assert::{Assert, OutputAssertExt};
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

use crate::common::ReleaseServer;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn spicetify() -> Command {
    let mut cmd = Command::cargo_bin("spicetify").unwrap();
    cmd.env("NO_COLOR", "1").env("SPICETIFY_NO_PROGRESS", "1").env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, server: &ReleaseServer) -> std::path::PathBuf {
    let path = dir.join("upgrade.toml");
    std::fs::write(&path, server.config_toml()).unwrap();
    path
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: Command) -> Assert {
    let output = tokio::task::spawn_blocking(move || cmd.output()).await.unwrap().unwrap();
    output.assert()
}

#[test]
fn test_help_lists_upgrade() {
    spicetify()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("upgrade"))
        .stdout(predicate::str::contains("--no-progress"));
}

#[test]
fn test_upgrade_help_mentions_check() {
    spicetify()
        .args(["upgrade", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--check"));
}

#[test]
fn test_version_flag() {
    spicetify()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(VERSION));
}

#[test]
fn test_invalid_config_fails() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("upgrade.toml");
    std::fs::write(&config, "[upgrade\nrepository = ").unwrap();

    spicetify()
        .arg("--config")
        .arg(&config)
        .arg("upgrade")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_check_reports_available_update() {
    let server = ReleaseServer::start().await;
    server.mount_latest("v99.0.0").await;
    server.mount_linux_artifact("99.0.0", 200, Vec::new(), 0).await;
    let temp = TempDir::new().unwrap();

    let mut cmd = spicetify();
    cmd.arg("--config").arg(write_config(temp.path(), &server)).args(["upgrade", "--check"]);

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Fetch latest release info: OK"))
        .stdout(predicate::str::contains(format!("Current version: {VERSION}")))
        .stdout(predicate::str::contains("Latest release: 99.0.0"))
        .stdout(predicate::str::contains(format!("Update available: {VERSION} -> 99.0.0")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_upgrade_when_current_is_latest() {
    let server = ReleaseServer::start().await;
    server.mount_latest(&format!("v{VERSION}")).await;
    let temp = TempDir::new().unwrap();

    let mut cmd = spicetify();
    cmd.arg("--config").arg(write_config(temp.path(), &server)).arg("upgrade");

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Already up-to-date."))
        .stdout(predicate::str::contains("Downloading").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_release_lookup_failure_exits_cleanly() {
    let server = ReleaseServer::start().await;
    server.mount_latest_response(500, "upstream error").await;
    let temp = TempDir::new().unwrap();

    let mut cmd = spicetify();
    cmd.arg("--config").arg(write_config(temp.path(), &server)).arg("upgrade");

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Fetch latest release info:"))
        .stdout(predicate::str::contains("OK").not())
        .stderr(predicate::str::contains("returned HTTP 500"));
}

#[cfg(target_os = "linux")]
#[tokio::test(flavor = "multi_thread")]
async fn test_missing_artifact_exits_with_failure() {
    let server = ReleaseServer::start().await;
    server.mount_latest("v99.0.0").await;
    server.mount_linux_artifact("99.0.0", 404, b"Not Found".to_vec(), 1).await;
    let temp = TempDir::new().unwrap();

    let mut cmd = spicetify();
    cmd.arg("--config").arg(write_config(temp.path(), &server)).arg("upgrade");

    run(cmd)
        .await
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Fetch latest release info: OK"))
        .stdout(predicate::str::contains("Downloading:"))
        .stderr(predicate::str::contains("HTTP 404"));
    assert!(!Path::new("/tmp/spicetify-99.0.0.tar.gz").exists());
}

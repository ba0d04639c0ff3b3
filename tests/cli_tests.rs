use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn sonic_upload() -> Command {
    let mut cmd = Command::cargo_bin("sonic-upload").unwrap();
    for var in [
        "SONIC_HOST",
        "SONIC_API_KEY",
        "SONIC_SCAN_DIR",
        "SONIC_PROJECT_ID",
        "GITHUB_OUTPUT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn prints_help() {
    let mut cmd = sonic_upload();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Upload ipa/apk build packages to Sonic"));
}

#[test]
fn find_prints_the_package_path() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("build/outputs")).unwrap();
    fs::write(dir.path().join("build/outputs/app-release.apk"), b"apk").unwrap();

    let mut cmd = sonic_upload();
    cmd.arg("find").arg("--scan-dir").arg(dir.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("app-release.apk"));
}

#[test]
fn find_fails_without_packages() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), b"txt").unwrap();

    let mut cmd = sonic_upload();
    cmd.arg("find").arg("--scan-dir").arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No package found"));
}

#[test]
fn upload_without_project_id_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("app.apk"), b"apk").unwrap();

    let mut cmd = sonic_upload();
    cmd.args(["upload", "--host", "http://127.0.0.1:9", "--api-key", "tok"])
        .arg("--scan-dir")
        .arg(dir.path())
        .arg("--no-progress");
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Missing project id"));
}

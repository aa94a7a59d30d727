use assert_cmd::Command;
use predicates::prelude::*;

/// Top-level help lists every subcommand
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("lake").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("provision"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("status"));
}

/// Version works without any deployment file in reach
#[test]
fn test_cli_version() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("lake").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("LAKE_CONFIG_PATH")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lakeflow"));
}

/// provision --help shows the confirmation skip flag
#[test]
fn test_provision_help() {
    let mut cmd = Command::cargo_bin("lake").unwrap();
    cmd.arg("provision")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
}

/// Without a deployment file the CLI fails with the discovery hint
#[test]
fn test_missing_deployment_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("lake").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("LAKE_CONFIG_PATH")
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No deployment file found"));
}

/// An invalid deployment file is rejected before any cloud call
#[test]
fn test_invalid_deployment_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("lakeflow.yaml");
    std::fs::write(&config, "cloud: ''\n").unwrap();

    let mut cmd = Command::cargo_bin("lake").unwrap();
    cmd.arg("--config")
        .arg(&config)
        .arg("validate")
        .assert()
        .failure();
}

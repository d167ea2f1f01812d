//! Integration tests for the kiln CLI surface.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_pipeline_commands() {
    Command::cargo_bin("kiln")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("train"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("evaluate"))
        .stdout(predicate::str::contains("teardown"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("kiln").unwrap().arg("--version").assert().success();
}

#[test]
fn test_upload_rejects_unknown_partition() {
    Command::cargo_bin("kiln")
        .unwrap()
        .args(["upload", "--partition", "weights"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown partition"));
}

#[test]
fn test_train_rejects_unknown_follow_target() {
    Command::cargo_bin("kiln")
        .unwrap()
        .args(["train", "--follow", "both"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown job to follow"));
}

#[test]
fn test_train_rejects_single_instance_distributed_job() {
    Command::cargo_bin("kiln")
        .unwrap()
        .args(["train", "--instances", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 2 instances"));
}

#[test]
fn test_missing_config_file_is_reported() {
    Command::cargo_bin("kiln")
        .unwrap()
        .args(["--config", "/nonexistent/kiln.toml", "fetch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

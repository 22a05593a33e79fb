//! Integration tests for the stackctl CLI surface

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn stackctl() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stackctl"));
    cmd.env("NO_COLOR", "1")
        .env_remove("STACKCTL_MANIFEST")
        .env_remove("STACKCTL_LOG");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    stackctl().assert().code(2).stderr(predicate::str::contains(
        "Render and deploy a server stack from cloud secrets",
    ));
}

#[test]
fn test_cli_help_lists_commands() {
    stackctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("health"))
        .stdout(predicate::str::contains("down"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    stackctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stackctl"));
}

#[test]
fn test_version_command_shows_version() {
    stackctl()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "stackctl {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = stackctl()
        .args(["version", "--json"])
        .output()
        .expect("run stackctl");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_command_is_usage_error() {
    stackctl().arg("launch").assert().code(2);
}

#[test]
fn test_down_help_mentions_volumes() {
    stackctl()
        .args(["down", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--volumes"));
}

// --- Error reporting ---

#[test]
fn test_missing_manifest_fails_with_hint() {
    let dir = tempfile::tempdir().expect("tempdir");
    stackctl()
        .current_dir(dir.path())
        .arg("render")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Manifest not found"))
        .stderr(predicate::str::contains("STACKCTL_MANIFEST"));
}

#[test]
fn test_missing_manifest_json_error_object() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = stackctl()
        .current_dir(dir.path())
        .args(["status", "--json"])
        .output()
        .expect("run stackctl");
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "MANIFEST_ERROR");
    assert!(
        value["message"]
            .as_str()
            .expect("message")
            .contains("stackctl.yaml")
    );
}

//! CLI integration tests

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

/// Build command for the breadguard-cli binary (finds it in target/debug when run via cargo test).
fn breadguard_cli() -> Command {
    cargo_bin_cmd!("breadguard-cli")
}

/// Path to breadguard library test fixtures (relative to workspace).
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("breadguard")
        .join("tests")
        .join("fixtures")
}

fn components_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("breadguard")
        .join("components")
}

#[test]
fn test_cli_help() {
    let mut cmd = breadguard_cli();

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Breadboard"));
}

#[test]
fn test_cli_version() {
    let mut cmd = breadguard_cli();

    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_check_valid_file() {
    let mut cmd = breadguard_cli();

    cmd.arg("check").arg(fixtures_dir().join("valid_blink.json"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Circuit is valid"));
}

#[test]
fn test_cli_check_short_circuit_fails() {
    let mut cmd = breadguard_cli();

    cmd.arg("check").arg(fixtures_dir().join("short_circuit.json"));
    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("[SHORT_CIRCUIT]"));
}

#[test]
fn test_cli_check_json_output() {
    let mut cmd = breadguard_cli();

    cmd.arg("check")
        .arg(fixtures_dir().join("short_circuit.json"))
        .arg("--format")
        .arg("json");

    let output = cmd.output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["summary"]["total_files"], 1);
    assert_eq!(json["results"][0]["valid"], false);
    assert_eq!(json["results"][0]["errors"][0]["type"], "SHORT_CIRCUIT");
}

#[test]
fn test_cli_check_github_output() {
    let mut cmd = breadguard_cli();

    cmd.arg("check")
        .arg(fixtures_dir().join("disconnected.json"))
        .arg("--format")
        .arg("github");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("::warning file="))
        .stdout(predicate::str::contains("DISCONNECTED_GROUPS"));
}

#[test]
fn test_cli_check_strict_promotes_warnings() {
    let mut cmd = breadguard_cli();

    cmd.arg("check")
        .arg(fixtures_dir().join("disconnected.json"))
        .arg("--strict");

    cmd.assert().code(1);
}

#[test]
fn test_cli_check_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("options.json");
    std::fs::write(&config, r#"{ "strictMode": true }"#).unwrap();

    let mut cmd = breadguard_cli();
    cmd.arg("check")
        .arg(fixtures_dir().join("disconnected.json"))
        .arg("--config")
        .arg(&config);

    cmd.assert().code(1);
}

#[test]
fn test_cli_check_missing_file() {
    let mut cmd = breadguard_cli();

    cmd.arg("check").arg(fixtures_dir().join("does_not_exist.json"));
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_cli_check_with_library_dir() {
    let mut cmd = breadguard_cli();

    cmd.arg("check")
        .arg(fixtures_dir().join("valid_blink.json"))
        .arg("--library")
        .arg(components_dir());

    cmd.assert().success();
}

#[test]
fn test_cli_check_with_missing_library() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = breadguard_cli();

    cmd.arg("check")
        .arg(fixtures_dir().join("valid_blink.json"))
        .arg("--library")
        .arg(dir.path().join("missing"));

    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("LIBRARY_LOAD_FAILED"));
}

#[test]
fn test_cli_project() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["valid_blink.json", "reversed_led.json"] {
        std::fs::copy(fixtures_dir().join(name), dir.path().join(name)).unwrap();
    }

    let mut cmd = breadguard_cli();
    cmd.arg("project").arg(dir.path());

    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("valid_blink.json"))
        .stdout(predicate::str::contains("[LED_REVERSED]"));
}

#[test]
fn test_cli_project_empty_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = breadguard_cli();

    cmd.arg("project").arg(dir.path());
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("No circuit files found"));
}

#[test]
fn test_cli_rules() {
    let mut cmd = breadguard_cli();

    cmd.arg("rules").arg("--details");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("structure"))
        .stdout(predicate::str::contains("references"))
        .stdout(predicate::str::contains("topology"))
        .stdout(predicate::str::contains("component_rules"));
}

#[test]
fn test_cli_components() {
    let mut cmd = breadguard_cli();

    cmd.arg("components");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("raspberry-pi-pico"))
        .stdout(predicate::str::contains("push-button"));
}

#[test]
fn test_cli_holes() {
    let mut cmd = breadguard_cli();

    cmd.arg("holes").arg("--columns").arg("5");
    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let holes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let holes = holes.as_array().unwrap();
    assert!(holes.iter().any(|h| h["id"] == "5J"));
    assert!(!holes.iter().any(|h| h["id"] == "6A"));
}

#[test]
fn test_cli_holes_rejects_out_of_range_columns() {
    for columns in ["0", "201", "4294967295"] {
        let mut cmd = breadguard_cli();
        cmd.arg("holes").arg("--columns").arg(columns);
        cmd.assert().code(2);
    }

    let mut cmd = breadguard_cli();
    cmd.arg("check")
        .arg(fixtures_dir().join("valid_blink.json"))
        .arg("--columns")
        .arg("100000");
    cmd.assert().code(2);
}

//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway home
//! directory and verify outputs.

use std::path::Path;
use std::process::Command;

fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "fieldlog-cli", "--"])
        .args(args)
        .env("HOME", home)
        .env("FIELDLOG_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn timer_lifecycle_round_trip() {
    let home = tempfile::tempdir().unwrap();

    let (stdout, stderr, code) = run_cli(home.path(), &["timer", "start"]);
    assert_eq!(code, 0, "timer start failed: {stderr}");
    let event: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(event["type"], "TimerStarted");

    let (stdout, _, code) = run_cli(home.path(), &["timer", "status"]);
    assert_eq!(code, 0);
    let view: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(view["is_running"], true);

    let (stdout, _, code) = run_cli(home.path(), &["timer", "pause"]);
    assert_eq!(code, 0);
    let event: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(event["type"], "TimerPaused");

    let (_, _, code) = run_cli(home.path(), &["timer", "stop"]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(home.path(), &["timer", "status"]);
    assert_eq!(code, 0);
    let view: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(view["is_running"], false);
    assert_eq!(view["is_paused"], false);
    assert_eq!(view["elapsed_seconds"], 0);
}

#[test]
fn stop_without_session_succeeds() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(home.path(), &["timer", "stop"]);
    assert_eq!(code, 0, "stop failed: {stderr}");
    // No session to stop: the snapshot is printed instead of an event.
    let snapshot: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(snapshot["type"], "StateSnapshot");
}

#[test]
fn save_without_session_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["timer", "save"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error"), "expected error, got: {stderr}");
}

#[test]
fn activity_totals_start_empty() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(home.path(), &["activity", "totals"]);
    assert_eq!(code, 0, "totals failed: {stderr}");
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["totals"]["entries"], 0);
    assert_eq!(report["goal_hours"], 50);
}

#[test]
fn config_round_trip() {
    let home = tempfile::tempdir().unwrap();

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "notifications.enabled"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "true");

    let (_, _, code) = run_cli(
        home.path(),
        &["config", "set", "notifications.enabled", "false"],
    );
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "notifications.enabled"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "false");

    let (_, _, code) = run_cli(home.path(), &["config", "get", "no.such.key"]);
    assert_ne!(code, 0);
}

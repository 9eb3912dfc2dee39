//! End-to-end tests for the pomowatch binary.
//!
//! Each test points the binary at its own state file so runs are isolated.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn pomowatch(state: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pomowatch").unwrap();
    cmd.env("POMOWATCH_STATE", state).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_status_on_fresh_state() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("timer.json");

    pomowatch(&state)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ready"))
        .stdout(predicate::str::contains("Work Session"))
        .stdout(predicate::str::contains("25:00"));

    assert!(!state.exists());
}

#[test]
fn test_skip_persists_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("timer.json");

    pomowatch(&state)
        .arg("skip")
        .assert()
        .success()
        .stdout(predicate::str::contains("Short Break"));

    pomowatch(&state)
        .args(["status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sessionType\": \"shortBreak\""))
        .stdout(predicate::str::contains("\"sessionsCompleted\": 1"))
        .stdout(predicate::str::contains("\"formattedTime\": \"05:00\""));
}

#[test]
fn test_fourth_skip_reaches_long_break() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("timer.json");

    for _ in 0..7 {
        pomowatch(&state).arg("skip").assert().success();
    }

    pomowatch(&state)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Long Break"))
        .stdout(predicate::str::contains("Completed: 4"))
        .stdout(predicate::str::contains("15:00"));
}

#[test]
fn test_reset_and_hard_reset() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("timer.json");

    pomowatch(&state).arg("skip").assert().success();
    pomowatch(&state)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Work Session"))
        .stdout(predicate::str::contains("Completed: 1"));
    assert!(!state.exists());

    pomowatch(&state).arg("skip").assert().success();
    pomowatch(&state)
        .arg("hard-reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed: 0"));
    assert!(!state.exists());
}

#[test]
fn test_corrupt_state_file_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("timer.json");
    std::fs::write(&state, "{ broken").unwrap();

    pomowatch(&state)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("25:00"));
}

#[test]
fn test_run_quit_pauses_and_saves() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("timer.json");

    pomowatch(&state)
        .args(["run", "--no-bell"])
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Paused"))
        .stdout(predicate::str::contains("Work Session"));

    let saved = std::fs::read_to_string(&state).unwrap();
    assert!(saved.contains("\"isRunning\": false"));
    assert!(saved.contains("\"sessionType\": \"work\""));

    pomowatch(&state)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Work Session"));
}

#[test]
fn test_run_controls_skip_then_quit() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("timer.json");

    pomowatch(&state)
        .args(["run", "--no-bell"])
        .write_stdin("n\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Short Break"))
        .stdout(predicate::str::contains("Completed: 1"));

    let saved = std::fs::read_to_string(&state).unwrap();
    assert!(saved.contains("\"sessionType\": \"shortBreak\""));
    assert!(saved.contains("\"isRunning\": false"));
}

#[test]
fn test_status_leaves_running_snapshot_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("timer.json");
    let saved_at = chrono::Utc::now().to_rfc3339();
    let running = format!(
        r#"{{"sessionType":"work","timeRemaining":1200.0,"sessionsCompleted":0,"isRunning":true,"savedAt":"{}"}}"#,
        saved_at
    );
    std::fs::write(&state, &running).unwrap();

    pomowatch(&state)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Work Session"));

    assert_eq!(std::fs::read_to_string(&state).unwrap(), running);
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    pomowatch(&dir.path().join("timer.json"))
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pomowatch"));
}

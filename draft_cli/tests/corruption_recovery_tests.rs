//! Corruption recovery tests for draft_cli.
//!
//! These tests verify the system can handle:
//! - Corrupted local draft documents
//! - Drafts stored under the wrong user key
//! - Corrupted remote rows
//! - Missing bootstrap payloads

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("repdraft"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config-home"));
    cmd.env("HOME", data_dir);
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

fn write_bootstrap(dir: &Path) -> std::path::PathBuf {
    let payload = r#"{
        "workout": { "workout_id": "w1", "title": "Pull Day" },
        "exercises": [
            {
                "exercise_id": "row",
                "order_index": 0,
                "name": "Barbell Row",
                "kind": "strength",
                "prescription": { "target_sets": 3 }
            }
        ]
    }"#;

    let path = dir.join("bootstrap.json");
    fs::write(&path, payload).expect("Failed to write bootstrap payload");
    path
}

#[test]
fn test_corrupted_local_draft_starts_fresh() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::create_dir_all(data_dir.join("drafts")).unwrap();
    fs::write(data_dir.join("drafts/u1.json"), "{ invalid json }}}}").unwrap();

    // A corrupt document is treated as absent; start falls through to the
    // bootstrap and rebuilds
    let bootstrap = write_bootstrap(data_dir);
    cli(data_dir)
        .args(["start", "--user", "u1", "--workout", "w1"])
        .arg("--bootstrap")
        .arg(&bootstrap)
        .assert()
        .success()
        .stdout(predicate::str::contains("Pull Day"));

    // The rebuilt document is valid JSON again
    let contents = fs::read_to_string(data_dir.join("drafts/u1.json")).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&contents).is_ok());
}

#[test]
fn test_corrupted_local_draft_cannot_resume() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::create_dir_all(data_dir.join("drafts")).unwrap();
    fs::write(data_dir.join("drafts/u1.json"), "not json at all").unwrap();

    // Without a bootstrap there is nothing to fall through to
    cli(data_dir)
        .args(["status", "--user", "u1"])
        .assert()
        .failure();
}

#[test]
fn test_foreign_user_draft_is_not_resumed() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    // Start a session for u2, then copy its document under u1's key
    let bootstrap = write_bootstrap(data_dir);
    cli(data_dir)
        .args(["start", "--user", "u2", "--workout", "w1"])
        .arg("--bootstrap")
        .arg(&bootstrap)
        .assert()
        .success();
    fs::copy(
        data_dir.join("drafts/u2.json"),
        data_dir.join("drafts/u1.json"),
    )
    .unwrap();

    cli(data_dir)
        .args(["status", "--user", "u1"])
        .assert()
        .failure();
}

#[test]
fn test_corrupted_remote_row_falls_back_to_local() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let bootstrap = write_bootstrap(data_dir);
    cli(data_dir)
        .args(["start", "--user", "u1", "--workout", "w1"])
        .arg("--bootstrap")
        .arg(&bootstrap)
        .assert()
        .success();

    // Clobber the remote row; the local copy must still resume
    fs::write(data_dir.join("remote/u1.json"), "{ truncated").unwrap();

    cli(data_dir)
        .args(["status", "--user", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Barbell Row"));
}

#[test]
fn test_missing_bootstrap_file_is_fatal() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["start", "--user", "u1", "--workout", "w1"])
        .arg("--bootstrap")
        .arg(data_dir.join("nonexistent.json"))
        .assert()
        .failure();
}

#[test]
fn test_bootstrap_for_wrong_workout_is_fatal() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let bootstrap = write_bootstrap(data_dir);
    cli(data_dir)
        .args(["start", "--user", "u1", "--workout", "other_workout"])
        .arg("--bootstrap")
        .arg(&bootstrap)
        .assert()
        .failure();
}

#[test]
fn test_remote_only_resume_after_local_loss() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let bootstrap = write_bootstrap(data_dir);
    cli(data_dir)
        .args(["start", "--user", "u1", "--workout", "w1"])
        .arg("--bootstrap")
        .arg(&bootstrap)
        .assert()
        .success();

    cli(data_dir)
        .args([
            "log", "--user", "u1", "--exercise", "1", "--set", "1", "--reps", "5",
            "--weight", "80",
        ])
        .assert()
        .success();

    // Simulate a reinstall: local store gone, remote row intact
    fs::remove_file(data_dir.join("drafts/u1.json")).unwrap();

    cli(data_dir)
        .args(["status", "--user", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 reps × 80kg"));

    // Adoption mirrored the remote copy back into local
    assert!(data_dir.join("drafts/u1.json").exists());
}

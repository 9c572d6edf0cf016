//! Integration tests for the command-line front-end.
//!
//! Each test runs the built binary against a scratch snapshot file.

use std::path::Path;
use std::process::{Command, Output};

fn run(data: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tourney_cli"))
        .args(args)
        .arg("--data")
        .arg(data)
        .env_remove("TOURNEY_DATA_FILE")
        .env_remove("TOURNEY_SEED")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run tourney_cli")
}

fn run_ok(data: &Path, args: &[&str]) -> String {
    let output = run(data, args);
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_help() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(&dir.path().join("data.json"), &["--help"]);
    assert!(out.contains("USAGE:"));
    assert!(!dir.path().join("data.json").exists());
}

#[test]
fn test_group_stage_to_knockout() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("cup.json");

    let out = run_ok(
        &data,
        &["new-competition", "--format", "groups_knockout", "--kind", "futsal", "Winter Cup"],
    );
    assert!(out.contains("Created competition 1"));
    for i in 1..=8 {
        run_ok(&data, &["add-team", "1", &format!("Team {i}")]);
    }

    let out = run_ok(
        &data,
        &["draw-groups", "1", "--groups", "2", "--per-group", "4", "--seed", "5"],
    );
    assert!(out.contains("Group A:"));
    assert!(out.contains("Group B:"));

    let early = run_ok(&data, &["knockout", "1", "--size", "4"]);
    assert!(early.contains("Group stage not finished"));

    // Two groups of four: matches 1 to 12
    for match_id in 1..=12 {
        run_ok(&data, &["record", &match_id.to_string(), "2", "1"]);
    }

    let out = run_ok(&data, &["knockout", "1", "--size", "4", "--seed", "5"]);
    assert!(out.starts_with("Semifinal:"));
    assert_eq!(out.lines().count(), 3);

    let fixtures = run_ok(&data, &["fixtures", "1"]);
    assert_eq!(fixtures.lines().count(), 14);
}

#[test]
fn test_invalid_layout_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("cup.json");
    run_ok(&data, &["new-competition", "--format", "groups_knockout", "Cup"]);
    run_ok(&data, &["add-team", "1", "Solo"]);

    let output = run(&data, &["draw-groups", "1", "--groups", "1", "--per-group", "2"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid group layout"));
}

#[test]
fn test_corrupt_snapshot_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data.json");
    std::fs::write(&data, "garbage").unwrap();

    let output = run(&data, &["add-team", "1", "Reds"]);
    assert!(!output.status.success());
    assert_eq!(std::fs::read_to_string(&data).unwrap(), "garbage");
}

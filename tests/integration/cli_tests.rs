//! CLI integration tests
//!
//! These tests verify that the CLI works correctly with various options.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn layoutstat() -> Command {
    let mut cmd = Command::cargo_bin("layoutstat").expect("Binary not found");
    cmd.env("NO_COLOR", "1");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    layoutstat()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("layoutstat"))
        .stdout(predicate::str::contains("tags"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_cli_version() {
    layoutstat()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("layoutstat"));
}

#[test]
fn test_tags_requires_output() {
    layoutstat()
        .args(["tags", "--repo"])
        .arg(fixtures_path().join("repo"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn test_tags_rejects_layouts_with_repo() {
    let dir = tempfile::tempdir().unwrap();
    layoutstat()
        .args(["tags", "-o"])
        .arg(dir.path().join("out.csv"))
        .arg(fixtures_path().join("repo/calculator/res/layout"))
        .arg("--repo")
        .arg(fixtures_path().join("repo"))
        .assert()
        .failure();
}

// ============================================================================
// tags
// ============================================================================

#[test]
fn test_tags_over_repository() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("stats.csv");

    layoutstat()
        .args(["tags", "-o"])
        .arg(&output)
        .arg("--repo")
        .arg(fixtures_path().join("repo"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 new and 0 existing rows"));

    let csv = std::fs::read_to_string(&output).unwrap();
    let header = csv.lines().next().unwrap();
    assert!(header.contains("layoutCount"));
    assert!(header.contains("tag_Button"));
    assert!(!header.contains("NoteView"));
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn test_tags_single_app_with_blanks() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("stats.csv");
    let res = fixtures_path().join("repo/notes/app/src/main/res");

    layoutstat()
        .args(["tags", "--blanks", "--custom", "-q", "-o"])
        .arg(&output)
        .arg(res.join("layout"))
        .arg("--values")
        .arg(res.join("values"))
        .assert()
        .success();

    let csv = std::fs::read_to_string(&output).unwrap();
    assert!(csv.lines().next().unwrap().contains("tag_com.example.notes.NoteView"));
    assert_eq!(csv.lines().count(), 2);
}

#[test]
fn test_tags_appends_to_existing_csv() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("stats.csv");
    std::fs::write(&output, "package,previous\nold-app,1\n").unwrap();

    layoutstat()
        .args(["tags", "-o"])
        .arg(&output)
        .arg(fixtures_path().join("repo/calculator/res/layout"))
        .assert()
        .success()
        .stdout(predicate::str::contains("1 existing rows"));

    let csv = std::fs::read_to_string(&output).unwrap();
    assert!(csv.lines().next().unwrap().contains("previous"));
    assert!(csv.contains("old-app"));
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn test_dirlist_cache_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let dirlist = dir.path().join("dirs.json");
    let output = dir.path().join("stats.csv");

    layoutstat()
        .args(["tags", "--cache", "-o"])
        .arg(&output)
        .arg("--repo")
        .arg(fixtures_path().join("repo"))
        .arg("--dirlist")
        .arg(&dirlist)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cached 3 applications"));
    assert!(dirlist.exists());

    layoutstat()
        .args(["tags", "-o"])
        .arg(&output)
        .arg("--dirlist")
        .arg(&dirlist)
        .assert()
        .success()
        .stdout(predicate::str::contains("Using application layouts in"));

    let csv = std::fs::read_to_string(&output).unwrap();
    assert_eq!(csv.lines().count(), 5);
}

#[test]
fn test_unknown_device_preset_fails() {
    let dir = tempfile::tempdir().unwrap();
    layoutstat()
        .args(["tags", "--device", "pixel-9", "-o"])
        .arg(dir.path().join("out.csv"))
        .arg(fixtures_path().join("repo/calculator/res/layout"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("pixel-9"));
}

#[test]
fn test_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("run.log");

    layoutstat()
        .args(["tags", "-v", "-o"])
        .arg(dir.path().join("out.csv"))
        .arg(fixtures_path().join("repo/calculator/res/layout"))
        .arg("-l")
        .arg(&log)
        .assert()
        .success();

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("layoutstat v"));
    assert!(contents.contains("RelativeLayout"));
}

// ============================================================================
// inspect
// ============================================================================

#[test]
fn test_inspect_layout() {
    let fixtures = fixtures_path();
    layoutstat()
        .arg("inspect")
        .arg(fixtures.join("layouts/login.xml"))
        .arg("--values")
        .arg(fixtures.join("values"))
        .args(["--device", "baseline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LinearLayout"))
        .stdout(predicate::str::contains("320dp x 480dp"))
        .stdout(predicate::str::contains("text=\"Sign in\""))
        .stdout(predicate::str::contains("3 elements, 1 buttons on baseline"));
}

#[test]
fn test_inspect_unsupported_layout() {
    layoutstat()
        .arg("inspect")
        .arg(fixtures_path().join("repo/calculator/res/layout/about.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("RelativeLayout"));
}

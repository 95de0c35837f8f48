//! End-to-end CLI integration tests
//!
//! These tests use assert_cmd to drive the gitcmd binary. Most run with
//! --dry-run so they only check argument assembly.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn gitcmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gitcmd").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .arg("-C")
        .arg(dir.path());
    cmd
}

#[test]
fn test_dry_run_clone_tag_or_branch() {
    let dir = TempDir::new().unwrap();
    gitcmd(&dir)
        .args(["--dry-run", "clone-tag-or-branch", "https://x/y.git", "v1.0"])
        .assert()
        .success()
        .stdout(r#"git "clone" "--recursive" "--branch" "v1.0" "https://x/y.git" ".""#.to_string() + "\n");
}

#[test]
fn test_dry_run_preserves_option_order() {
    let dir = TempDir::new().unwrap();
    gitcmd(&dir)
        .args(["--dry-run", "submodule-update", "--jobs", "8", "--depth", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"git "submodule" "update" "--init" "--recursive" "--jobs" "8" "--depth" "1""#,
        ));
}

#[test]
fn test_dry_run_json() {
    let dir = TempDir::new().unwrap();
    gitcmd(&dir)
        .args(["--dry-run", "--json", "commit", "fix: bug"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""program": "git""#))
        .stdout(predicate::str::contains(r#""fix: bug""#));
}

#[test]
fn test_config_file_overrides_binary() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("alt.toml");
    std::fs::write(&config_path, "[git]\nbinary = \"/opt/git/bin/git\"\n").unwrap();

    gitcmd(&dir)
        .arg("--config")
        .arg(&config_path)
        .args(["--dry-run", "pull"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(r#"/opt/git/bin/git "pull""#));
}

#[test]
fn test_runs_git_and_forwards_exit_code() {
    let dir = TempDir::new().unwrap();

    gitcmd(&dir).arg("init").assert().success();
    assert!(dir.path().join(".git").is_dir());

    gitcmd(&dir)
        .args(["rev-parse", "refs/heads/does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::is_empty().not());
}

#[test]
fn test_missing_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    gitcmd(&dir).assert().failure();
}

#[test]
fn test_options_after_operation_are_passed_to_git() {
    let dir = TempDir::new().unwrap();
    gitcmd(&dir)
        .args(["--dry-run", "status", "-v"])
        .assert()
        .success()
        .stdout(r#"git "status" "-v""#.to_string() + "\n");

    gitcmd(&dir)
        .args(["--dry-run", "branch", "-C", "x"])
        .assert()
        .success()
        .stdout(r#"git "branch" "-C" "x""#.to_string() + "\n");

    gitcmd(&dir)
        .args(["--dry-run", "add", "-A"])
        .assert()
        .success()
        .stdout(r#"git "add" "-A""#.to_string() + "\n");
}

#[test]
fn test_pathspec_separator_survives() {
    let dir = TempDir::new().unwrap();
    gitcmd(&dir)
        .args(["--dry-run", "log", "%H", "--", "README.md"])
        .assert()
        .success()
        .stdout(r#"git "log" "-1" "--format=%H" "--" "README.md""#.to_string() + "\n");
}

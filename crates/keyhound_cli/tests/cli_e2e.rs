//! End-to-end tests for top-level CLI behaviour.

use assert_cmd::Command;
use predicates::prelude::*;

fn keyhound() -> Command {
    Command::new(env!("CARGO_BIN_EXE_keyhound"))
}

#[test]
fn no_args_shows_help() {
    keyhound()
        .assert()
        .failure()
        .stderr(predicate::str::contains("keyhound"));
}

#[test]
fn version_flag_works() {
    keyhound()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("keyhound"));
}

#[test]
fn help_lists_all_commands() {
    let output = keyhound().arg("--help").output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["hunt", "verify", "rules", "init"] {
        assert!(stdout.contains(command), "help should mention {command}");
    }
}

#[test]
fn unknown_command_fails() {
    keyhound().arg("chase").assert().failure();
}

#[test]
fn verify_unknown_provider_exits_with_error() {
    keyhound()
        .args(["verify", "nonexistent", "some-key"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn verify_unsupported_provider_exits_with_error() {
    // The generic bucket has no verification endpoint.
    keyhound()
        .args(["verify", "generic", "some-token"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn hunt_without_queries_or_config_is_a_noop() {
    let dir = tempfile::TempDir::new().unwrap();

    keyhound()
        .args(["hunt"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("no queries configured"));
}

#[test]
fn hunt_rejects_invalid_minimum_confidence() {
    keyhound()
        .args(["hunt", "--minimum-confidence", "certain", "query"])
        .assert()
        .failure();
}

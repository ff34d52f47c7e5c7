//! End-to-end tests for the `keyhound rules` command.

use assert_cmd::Command;
use predicates::prelude::*;

fn keyhound() -> Command {
    Command::new(env!("CARGO_BIN_EXE_keyhound"))
}

#[test]
fn rules_succeeds() {
    keyhound()
        .args(["rules"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rules"));
}

#[test]
fn rules_lists_known_providers() {
    let output = keyhound().args(["rules"]).output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("anthropic"));
    assert!(stdout.contains("openai"));
    assert!(stdout.contains("gemini"));
}

#[test]
fn tier_filter_high() {
    keyhound().args(["rules", "--tier", "high"]).assert().success();
}

#[test]
fn tier_filter_medium() {
    keyhound().args(["rules", "--tier", "medium"]).assert().success();
}

#[test]
fn tier_filter_low() {
    keyhound().args(["rules", "--tier", "low"]).assert().success();
}

#[test]
fn invalid_tier_fails() {
    keyhound().args(["rules", "--tier", "certain"]).assert().failure();
}

#[test]
fn provider_filter_shows_only_that_provider() {
    let output = keyhound().args(["rules", "--provider", "anthropic"]).output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("anthropic/api-key"));
    assert!(!stdout.contains("openai/api-key"));
}

#[test]
fn unknown_provider_reports_no_matches() {
    keyhound()
        .args(["rules", "--provider", "nonexistent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no rules match"));
}

#[test]
fn verbose_shows_regexes() {
    let output = keyhound().args(["rules", "--verbose"]).output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sk-ant-api03-"));
    assert!(stdout.contains("regex"));
}

#[test]
fn verbose_shows_more_than_table() {
    let normal = keyhound().args(["rules"]).output().unwrap();
    let verbose = keyhound().args(["rules", "--verbose"]).output().unwrap();

    assert!(
        verbose.stdout.len() >= normal.stdout.len(),
        "verbose should show at least as much as the table"
    );
}

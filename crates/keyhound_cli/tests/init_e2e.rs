//! End-to-end tests for the `keyhound init` command.

use std::fs;

use assert_cmd::Command;
use tempfile::TempDir;

fn keyhound() -> Command {
    Command::new(env!("CARGO_BIN_EXE_keyhound"))
}

#[test]
fn creates_config_file() {
    let dir = TempDir::new().unwrap();

    keyhound().args(["init"]).current_dir(dir.path()).assert().success();

    assert!(dir.path().join(".keyhound.toml").exists());
}

#[test]
fn config_file_contains_harvest_settings() {
    let dir = TempDir::new().unwrap();

    keyhound().args(["init"]).current_dir(dir.path()).assert().success();

    let content = fs::read_to_string(dir.path().join(".keyhound.toml")).unwrap();
    assert!(content.contains("max_pages"));
    assert!(content.contains("queries"));
    assert!(content.contains("minimum_confidence"));
}

#[test]
fn refuses_to_overwrite_without_force() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".keyhound.toml");
    fs::write(&path, "queries = [\"keep me\"]\n").unwrap();

    keyhound().args(["init"]).current_dir(dir.path()).assert().success();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("keep me"));
}

#[test]
fn force_overwrites_existing_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".keyhound.toml");
    fs::write(&path, "queries = [\"old\"]\n").unwrap();

    keyhound()
        .args(["init", "--force"])
        .current_dir(dir.path())
        .assert()
        .success();

    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains("\"old\""));
    assert!(content.contains("max_pages"));
}

#[test]
fn custom_output_path() {
    let dir = TempDir::new().unwrap();

    keyhound()
        .args(["init", "--output", "custom.toml"])
        .current_dir(dir.path())
        .assert()
        .success();

    assert!(dir.path().join("custom.toml").exists());
}

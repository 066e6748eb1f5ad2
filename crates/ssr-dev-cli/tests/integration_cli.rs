//! Integration tests for the `ssr-dev` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const VALID_CONFIG: &str = r#"{
    "template": "src/index.template.html",
    "client": { "command": ["npm", "run", "build:client"] },
    "server": { "command": ["npm", "run", "build:server"] },
    "error": { "command": ["npm", "run", "build:error"] }
}"#;

fn ssr_dev(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ssr-dev").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn project(config: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(
        temp.path().join("src/index.template.html"),
        "<html><!--vue-ssr-outlet--></html>",
    )
    .unwrap();
    fs::write(temp.path().join("ssr-dev.config.json"), config).unwrap();
    temp
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    ssr_dev(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_check_valid_project() {
    let temp = project(VALID_CONFIG);
    ssr_dev(&temp)
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("All checks passed!"));
}

#[test]
fn test_check_missing_template() {
    let temp = project(VALID_CONFIG);
    fs::remove_file(temp.path().join("src/index.template.html")).unwrap();

    ssr_dev(&temp)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("template not found"));
}

#[test]
fn test_check_without_commands_fails() {
    let temp = project("{}");
    ssr_dev(&temp)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("client.command"));
}

#[test]
fn test_check_explicit_missing_config() {
    let temp = TempDir::new().unwrap();
    ssr_dev(&temp)
        .args(["check", "--config", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_env_overrides_file() {
    let temp = project(VALID_CONFIG);
    ssr_dev(&temp)
        .arg("check")
        .env("SSR_DEV_TEMPLATE", "src/missing.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.html"));
}

#[test]
fn test_serve_rejects_port_zero() {
    let temp = project(VALID_CONFIG);
    ssr_dev(&temp)
        .args(["serve", "--port", "0"])
        .assert()
        .failure();
}

//! End-to-end tests for the state-guard binary
//!
//! Covers:
//! - `check` exit codes for valid, broken and warning-only descriptors
//! - the warnings-as-errors policy from `--config` and environment
//! - `describe` in both formats
//! - `replay` acceptance, rejection and unparseable states

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

const STRICT_ENV: &str = "STATE_GUARD__VALIDATION__WARNINGS_AS_ERRORS";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn state_guard() -> Command {
    let mut cmd = Command::cargo_bin("state-guard").unwrap();
    cmd.env_remove(STRICT_ENV).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_check_valid_descriptor() {
    state_guard()
        .arg("check")
        .arg(fixture("review_workflow.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("review_workflow.toml: ok"));
}

#[test]
fn test_check_missing_workflow_fails() {
    state_guard()
        .arg("check")
        .arg(fixture("missing_workflow.toml"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("StateField.required_workflow"))
        .stdout(predicate::str::contains("1 error(s), 0 warning(s)"));
}

#[test]
fn test_check_reports_field_name_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad_name.toml");
    let descriptor = std::fs::read_to_string(fixture("review_workflow.toml"))
        .unwrap()
        .replacen("name = \"status\"", "name = \"status_\"", 1);
    std::fs::write(&path, descriptor).unwrap();

    state_guard()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("StateField.invalid_name"));
}

#[test]
fn test_check_warning_only_passes_by_default() {
    state_guard()
        .arg("check")
        .arg(fixture("ticket_stage.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("StateField.dangling_target"))
        .stdout(predicate::str::contains("0 error(s), 1 warning(s)"));
}

#[test]
fn test_check_warning_fails_with_strict_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("strict.toml");
    std::fs::write(&config, "[validation]\nwarnings_as_errors = true\n").unwrap();

    state_guard()
        .arg("--config")
        .arg(&config)
        .arg("check")
        .arg(fixture("ticket_stage.json"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("StateField.dangling_target"));
}

#[test]
fn test_check_warning_fails_with_strict_env() {
    state_guard()
        .env(STRICT_ENV, "true")
        .arg("check")
        .arg(fixture("ticket_stage.json"))
        .assert()
        .failure();
}

#[test]
fn test_check_missing_file_fails() {
    state_guard()
        .arg("check")
        .arg(fixture("does_not_exist.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading descriptor"));
}

#[test]
fn test_describe_json_and_toml() {
    state_guard()
        .arg("describe")
        .arg(fixture("review_workflow.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"path\": \"state_guard.StateCharField\""));

    state_guard()
        .args(["describe", "--format", "toml"])
        .arg(fixture("ticket_stage.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("path = \"state_guard.StateIntegerField\""))
        .stdout(predicate::str::contains("[[workflow]]"));
}

#[test]
fn test_describe_unknown_format_fails() {
    state_guard()
        .args(["describe", "--format", "yaml"])
        .arg(fixture("review_workflow.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported descriptor format: yaml"));
}

#[test]
fn test_replay_accepts_permitted_history() {
    state_guard()
        .arg("replay")
        .arg(fixture("review_workflow.toml"))
        .args(["draft", "submitted", "rejected", "draft"])
        .assert()
        .success()
        .stdout(predicate::str::contains("accepted rejected"))
        .stdout(predicate::str::contains("final state: \"draft\""));
}

#[test]
fn test_replay_stops_at_first_rejection() {
    state_guard()
        .arg("replay")
        .arg(fixture("review_workflow.toml"))
        .args(["submitted", "draft", "approved"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("accepted submitted"))
        .stdout(predicate::str::contains(
            "rejected invalid transition on 'status': \"submitted\" -> \"draft\"",
        ))
        .stdout(predicate::str::contains("allowed next: [\"approved\", \"rejected\"]"))
        .stdout(predicate::str::contains("accepted approved").not())
        .stdout(predicate::str::contains("final state").not());
}

#[test]
fn test_replay_terminal_state_has_no_way_out() {
    state_guard()
        .arg("replay")
        .arg(fixture("review_workflow.toml"))
        .args(["approved", "draft"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("allowed next: []"));
}

#[test]
fn test_replay_integer_field() {
    state_guard()
        .arg("replay")
        .arg(fixture("ticket_stage.json"))
        .args(["1", "2", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("final state: 3"));
}

#[test]
fn test_replay_rejects_unparseable_state() {
    state_guard()
        .arg("replay")
        .arg(fixture("ticket_stage.json"))
        .args(["1", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "'abc' is not a valid state_guard.StateIntegerField state",
        ));
}

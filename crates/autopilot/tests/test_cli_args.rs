//! CLI argument parsing and offline command tests

mod common;

use assert_cmd::Command;
use common::TestEnv;
use predicates::prelude::*;

fn autopilot() -> Command {
    Command::new(env!("CARGO_BIN_EXE_autopilot"))
}

#[test]
fn test_help_flag() {
    autopilot()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("A goal-driven autonomous agent"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn test_version_flag() {
    autopilot()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_no_args_shows_usage() {
    autopilot()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_run_help_lists_flags() {
    autopilot()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--goal"))
        .stdout(predicate::str::contains("--continuous"))
        .stdout(predicate::str::contains("--max-cycles"));
}

#[test]
fn test_run_with_invalid_max_cycles() {
    autopilot()
        .args(["run", "--max-cycles", "many"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ============================================================================
// Offline commands
// ============================================================================

#[test]
fn test_commands_lists_advertised_table() {
    let env = TestEnv::new().unwrap();
    env.command()
        .arg("commands")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Google Search: \"google\""))
        .stdout(predicate::str::contains("\"read_file\""))
        .stdout(predicate::str::contains("\"task_complete\""))
        .stdout(predicate::str::contains("\"execute_shell\"").not())
        .stdout(predicate::str::contains("\"do_nothing\"").not());
}

#[test]
fn test_commands_include_shell_when_enabled() {
    let env = TestEnv::new().unwrap();
    env.create_config_with_shell().unwrap();
    env.command()
        .arg("commands")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"execute_shell\""));
}

#[test]
fn test_help_for_known_command() {
    let env = TestEnv::new().unwrap();
    env.command()
        .args(["help", "read_file"])
        .assert()
        .success()
        .stdout(predicate::str::contains("read_file"));
}

#[test]
fn test_help_for_unknown_command() {
    let env = TestEnv::new().unwrap();
    env.command()
        .args(["help", "frobnicate"])
        .assert()
        .success()
        .stdout("Invalid command or no help available.\n");
}

#[test]
fn test_init_creates_config_and_settings() {
    let env = TestEnv::new().unwrap();
    env.command()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Autopilot initialized"));

    assert!(env.data_file("config.json").exists());
    assert!(env.data_file("ai_settings.json").exists());
    assert!(env.data_file("workspace").is_dir());
}

#[test]
fn test_status_before_and_after_init() {
    let env = TestEnv::new().unwrap();
    env.command()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("[Missing]"))
        .stdout(predicate::str::contains("[Keyless]"))
        .stdout(predicate::str::contains("Shell:     [Disabled]"));

    env.command().arg("init").assert().success();
    env.command()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workspace: "))
        .stdout(predicate::str::contains("[OK]"));
}

#[test]
fn test_run_without_api_key_fails() {
    let env = TestEnv::new().unwrap();
    env.command()
        .args(["run", "--goal", "write a poem", "--continuous"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API key configured"));
}

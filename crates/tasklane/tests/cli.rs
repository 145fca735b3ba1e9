use std::path::Path;

use predicates::prelude::*;
use tempfile::TempDir;

const TASK_FILE: &str = r#"
[script]
description = "Sample Script"
default_target = "Build-All"

[[tasks]]
kind = "build-clean"
name = "Sln"
command = "echo clean >> order.txt"

[[tasks]]
kind = "build"
name = "Sln"
command = "echo build >> order.txt"

[[tasks]]
kind = "generic"
name = "Deploy"
category = "Release"
task_type = "Release"
command = "echo deploy >> order.txt"
depends_on = ["Build-All"]

[[arguments]]
name = "deploy"
short = "d"
description = "Builds and deploys"
target = "Deploy"
"#;

fn tasklane(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("tasklane"));
    cmd.current_dir(dir).env("HOME", dir).env_remove("RUST_LOG");
    cmd
}

fn project(task_file: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("tasklane.toml"), task_file).unwrap();
    temp
}

fn order(dir: &Path) -> String {
    std::fs::read_to_string(dir.join("order.txt")).unwrap_or_default()
}

#[test]
fn test_no_actions_shows_general_help() {
    let temp = project(TASK_FILE);
    tasklane(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Sample Script"))
        .stdout(predicate::str::contains("Available Actions:"))
        .stdout(predicate::str::contains("  --support|-h"))
        .stdout(predicate::str::contains("  --available-targets|-at"))
        .stdout(predicate::str::contains("  --run|-r"))
        .stdout(predicate::str::contains("  --deploy|-d"));
}

#[test]
fn test_help_without_task_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    tasklane(temp.path())
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Build Script"))
        .stdout(predicate::str::contains("Action: --support | -h"));
}

#[test]
fn test_action_help() {
    let temp = project(TASK_FILE);
    tasklane(temp.path())
        .args(["-r", "-h"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Action: --run | -r"));
    assert_eq!(order(temp.path()), "");
}

#[test]
fn test_available_targets() {
    let temp = project(TASK_FILE);
    tasklane(temp.path())
        .arg("-at")
        .assert()
        .success()
        .stdout(predicate::str::contains("Target Categories Available:"))
        .stdout(predicate::str::contains("  Category: Build"))
        .stdout(predicate::str::contains("    - Build-All\n      - Build-Sln"))
        .stdout(predicate::str::contains("  Category: Release"));
}

#[test]
fn test_run_target_in_dependency_order() {
    let temp = project(TASK_FILE);
    tasklane(temp.path()).arg("--run=Build-All").assert().success();
    assert_eq!(order(temp.path()), "clean\nbuild\n");
}

#[test]
fn test_run_uses_default_target() {
    let temp = project(TASK_FILE);
    tasklane(temp.path()).arg("-r").assert().success();
    assert_eq!(order(temp.path()), "clean\nbuild\n");
}

#[test]
fn test_target_argument_runs_its_target() {
    let temp = project(TASK_FILE);
    tasklane(temp.path()).arg("--deploy").assert().success();
    assert_eq!(order(temp.path()), "clean\nbuild\ndeploy\n");
}

#[test]
fn test_run_without_target_is_invalid_argument() {
    let temp = project("[script]\ndescription = \"No Default\"\n");
    tasklane(temp.path())
        .arg("--run")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No target or Default Target defined for --run | -r"));
}

#[test]
fn test_failing_command_exits_with_task_failure() {
    let temp = project(
        r#"
[[tasks]]
kind = "build"
name = "Sln"
command = "exit 7"
"#,
    );
    tasklane(temp.path())
        .arg("--run=Build-All")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Build-Sln failed"));
}

#[test]
fn test_invalid_task_file_is_config_error() {
    let temp = project("[[tasks]]\nkind = \"compile\"\nname = \"Sln\"\n");
    tasklane(temp.path()).arg("-at").assert().code(2);
}

#[test]
fn test_explicit_task_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("custom.toml");
    std::fs::write(&file, TASK_FILE).unwrap();

    tasklane(temp.path())
        .arg("--file")
        .arg(&file)
        .arg("-at")
        .assert()
        .success()
        .stdout(predicate::str::contains("Category: Release"));
}

#[test]
fn test_dry_run_prints_plan_only() {
    let temp = project(TASK_FILE);
    tasklane(temp.path())
        .args(["--dry-run", "--run=Build-All"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Build-Sln"))
        .stdout(predicate::str::contains("[DRY RUN - no tasks will be executed]"));
    assert_eq!(order(temp.path()), "");
}

#[test]
fn test_json_summary() {
    let temp = project(TASK_FILE);
    tasklane(temp.path())
        .args(["--format", "json", "--run=Build-All"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"target\": \"Build-All\""))
        .stdout(predicate::str::contains("\"status\": \"success\""));
}

#[test]
fn test_init_writes_task_file() {
    let temp = TempDir::new().unwrap();
    tasklane(temp.path()).arg("--init").assert().success();
    assert!(temp.path().join("tasklane.toml").exists());

    tasklane(temp.path())
        .arg("--init")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--force"));

    tasklane(temp.path()).args(["--init", "--force"]).assert().success();
}

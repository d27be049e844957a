//! Integration tests for the rigup binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A throwaway home directory, optionally with `~/.rigup/config.yml`.
fn setup_home(config: Option<&str>) -> TempDir {
    let temp = TempDir::new().unwrap();
    if let Some(config) = config {
        let dir = temp.path().join(".rigup");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), config).unwrap();
    }
    temp
}

fn rigup(home: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("rigup"));
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("XDG_CACHE_HOME")
        .env_remove("RUST_LOG")
        .env_remove("RIGUP_CONFIG")
        .env_remove("RIGUP_PROMPT_GIT_USER_NAME")
        .env_remove("RIGUP_PROMPT_GIT_USER_EMAIL");
    cmd
}

const FILE_STEPS: &str = r#"
settings:
  skip_github_login: true
  skip_ssh_key_generation: true
steps:
  - name: shell path
    action:
      append_line:
        path: ~/.profile
        line: export PATH="$HOME/.local/bin:$PATH"
  - name: marker
    probe:
      path_exists: ~/marker
    action:
      run_shell_snippet: touch "$HOME/marker"
"#;

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(None);
    rigup(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("status"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(None);
    rigup(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn config_schema_is_json() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(None);
    let output = rigup(home.path())
        .args(["config", "--schema"])
        .output()?;

    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert!(schema["properties"]["steps"].is_object());
    Ok(())
}

#[test]
fn init_writes_config_once() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(None);

    rigup(home.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    let written = fs::read_to_string(home.path().join(".rigup/config.yml"))?;
    assert!(written.contains("steps:"));

    rigup(home.path()).arg("init").assert().code(1);
    rigup(home.path()).args(["init", "--force"]).assert().success();
    Ok(())
}

#[test]
fn invalid_config_exits_with_config_code() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(Some(
        r#"
steps:
  - name: broken
    action:
      teleport: somewhere
"#,
    ));

    rigup(home.path())
        .args(["run", "--non-interactive"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error"));
    Ok(())
}

#[test]
fn duplicate_step_names_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(Some(
        r#"
steps:
  - name: tools
    action:
      install_packages: [jq]
  - name: tools
    action:
      install_packages: [curl]
"#,
    ));

    rigup(home.path())
        .arg("status")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("more than once"));
    Ok(())
}

#[test]
fn missing_explicit_config_is_a_config_error() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(None);
    rigup(home.path())
        .args(["--config", "nope.yml", "status"])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn dry_run_changes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(Some(FILE_STEPS));

    rigup(home.path())
        .args(["run", "--dry-run", "--non-interactive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would run `touch"))
        .stdout(predicate::str::contains("git user.name - would ask for git_user_name"))
        .stdout(predicate::str::contains("4 of 4 steps would run"));

    assert!(!home.path().join("marker").exists());
    assert!(!home.path().join(".profile").exists());
    Ok(())
}

#[test]
fn run_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(Some(FILE_STEPS));

    rigup(home.path())
        .args(["run", "--non-interactive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 ran, 0 skipped, 0 failed"));

    assert!(home.path().join("marker").exists());
    let profile = fs::read_to_string(home.path().join(".profile"))?;
    assert_eq!(
        profile.matches("export PATH=\"$HOME/.local/bin:$PATH\"").count(),
        1
    );

    rigup(home.path())
        .args(["run", "--non-interactive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 ran, 2 skipped, 0 failed"));

    let profile = fs::read_to_string(home.path().join(".profile"))?;
    assert_eq!(
        profile.matches("export PATH=\"$HOME/.local/bin:$PATH\"").count(),
        1
    );
    Ok(())
}

#[test]
fn run_only_selects_steps() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(Some(FILE_STEPS));

    rigup(home.path())
        .args(["run", "--non-interactive", "--only", "marker"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 ran, 0 skipped, 0 failed"));

    assert!(home.path().join("marker").exists());
    assert!(!home.path().join(".profile").exists());

    rigup(home.path())
        .args(["run", "--non-interactive", "--only", "nope"])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn critical_failure_stops_the_run() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(Some(
        r#"
settings:
  skip_github_login: true
  skip_ssh_key_generation: true
steps:
  - name: doomed
    critical: true
    action:
      run_shell_snippet: exit 3
  - name: marker
    probe:
      path_exists: ~/marker
    action:
      run_shell_snippet: touch "$HOME/marker"
"#,
    ));

    rigup(home.path())
        .args(["run", "--non-interactive"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("doomed"));

    assert!(!home.path().join("marker").exists());
    Ok(())
}

#[test]
fn non_critical_failure_continues() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(Some(
        r#"
settings:
  skip_github_login: true
  skip_ssh_key_generation: true
steps:
  - name: flaky
    action:
      run_shell_snippet: exit 3
  - name: marker
    probe:
      path_exists: ~/marker
    action:
      run_shell_snippet: touch "$HOME/marker"
"#,
    ));

    rigup(home.path())
        .args(["run", "--non-interactive"])
        .assert()
        .success()
        .stderr(predicate::str::contains("1 ran, 0 skipped, 1 failed"))
        .stderr(predicate::str::contains("flaky"));

    assert!(home.path().join("marker").exists());
    Ok(())
}

#[test]
fn json_report_lists_every_step() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(Some(FILE_STEPS));

    let output = rigup(home.path())
        .args(["run", "--non-interactive", "--json"])
        .output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["state"], "completed");
    assert_eq!(report["steps"].as_array().map(Vec::len), Some(2));
    assert_eq!(report["counts"]["ran"], 2);
    Ok(())
}

#[test]
fn status_reports_satisfied_steps() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(Some(FILE_STEPS));
    fs::write(home.path().join("marker"), "")?;

    let output = rigup(home.path()).args(["status", "--json"]).output()?;
    assert!(output.status.success());

    let previews: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let previews = previews.as_array().unwrap();
    assert_eq!(previews.len(), 2);
    assert_eq!(previews[0]["name"], "shell path");
    assert_eq!(previews[0]["satisfied"], false);
    assert_eq!(previews[1]["name"], "marker");
    assert_eq!(previews[1]["satisfied"], true);

    rigup(home.path())
        .args(["status", "--step", "missing"])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn cache_commands_work_on_empty_cache() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(None);

    rigup(home.path())
        .args(["cache", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(home.path().to_string_lossy().as_ref()));

    rigup(home.path())
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache is empty"));
    Ok(())
}

#[test]
fn completions_generate_for_bash() -> Result<(), Box<dyn std::error::Error>> {
    let home = setup_home(None);
    rigup(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rigup"));
    Ok(())
}

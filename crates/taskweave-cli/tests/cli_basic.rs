//! CLI smoke tests. None of these reach the network beyond a local mock
//! server.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Invoke the CLI against `data_dir` and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    run_cli_with_env(data_dir, args, &[])
}

fn run_cli_with_env(data_dir: &Path, args: &[&str], env: &[(&str, &str)]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_taskweave"))
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .env_remove("RUST_LOG")
        .envs(env.iter().copied())
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\nstderr: {stderr}");
    stdout
}

fn run_cli_failure(data_dir: &Path, args: &[&str]) -> String {
    let (_, stderr, code) = run_cli(data_dir, args);
    assert_ne!(code, 0, "CLI command unexpectedly succeeded: {args:?}");
    stderr
}

#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    let stdout = run_cli_success(dir.path(), &["--help"]);
    for command in ["run", "sync", "schedule", "state", "config", "auth", "lists", "travel"] {
        assert!(stdout.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_config_path_and_defaults() {
    let dir = TempDir::new().unwrap();

    let path = run_cli_success(dir.path(), &["config", "path"]);
    assert_eq!(path.trim(), dir.path().join("config.toml").display().to_string());

    assert_eq!(run_cli_success(dir.path(), &["config", "get", "schedule.work_start_hour"]).trim(), "9");
    assert_eq!(run_cli_success(dir.path(), &["config", "get", "lists.inbox_name"]).trim(), "■メモ");
    // First load writes the defaults.
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_show_is_json() {
    let dir = TempDir::new().unwrap();
    let stdout = run_cli_success(dir.path(), &["config", "show"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["schedule"]["horizon_days"], 14);
    assert_eq!(json["markers"]["scheduled_prefix"], "【予定済】");
}

#[test]
fn test_config_set_persists() {
    let dir = TempDir::new().unwrap();

    run_cli_success(dir.path(), &["config", "set", "schedule.horizon_days", "7"]);

    assert_eq!(run_cli_success(dir.path(), &["config", "get", "schedule.horizon_days"]).trim(), "7");
    let content = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(content.contains("horizon_days = 7"));
}

#[test]
fn test_config_rejects_bad_values() {
    let dir = TempDir::new().unwrap();

    let stderr = run_cli_failure(dir.path(), &["config", "set", "schedule.work_start_hour", "20"]);
    assert!(stderr.contains("error:"));
    assert_eq!(run_cli_success(dir.path(), &["config", "get", "schedule.work_start_hour"]).trim(), "9");

    run_cli_failure(dir.path(), &["config", "get", "no.such.key"]);
}

#[test]
fn test_state_empty() {
    let dir = TempDir::new().unwrap();
    assert_eq!(run_cli_success(dir.path(), &["state", "list"]).trim(), "no links");
    run_cli_failure(dir.path(), &["state", "get", "t1"]);
}

#[test]
fn test_state_list_get_unlink() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("state.json");
    std::fs::write(&state_path, r#"{"t1": "e1", "t2": "e2"}"#).unwrap();

    let listed = run_cli_success(dir.path(), &["state", "list"]);
    assert_eq!(listed.lines().collect::<Vec<_>>(), vec!["t1 -> e1", "t2 -> e2"]);

    let json: serde_json::Value =
        serde_json::from_str(&run_cli_success(dir.path(), &["state", "list", "--json"])).unwrap();
    assert_eq!(json["t2"], "e2");

    assert_eq!(run_cli_success(dir.path(), &["state", "get", "t1"]).trim(), "e1");

    let unlinked = run_cli_success(dir.path(), &["state", "unlink", "t1"]);
    assert_eq!(unlinked.trim(), "unlinked t1 (was e1)");

    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&state_path).unwrap()).unwrap();
    assert_eq!(on_disk, serde_json::json!({"t2": "e2"}));

    assert_eq!(run_cli_success(dir.path(), &["state", "unlink", "t1"]).trim(), "no link for task t1");
}

#[test]
fn test_malformed_state_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("state.json"), "not json").unwrap();
    assert_eq!(run_cli_success(dir.path(), &["state", "list"]).trim(), "no links");
}

#[test]
fn test_travel_falls_back_to_configured_default() {
    let dir = TempDir::new().unwrap();
    run_cli_success(dir.path(), &["config", "set", "analysis.enabled", "false"]);
    run_cli_success(dir.path(), &["config", "set", "analysis.default_travel_minutes", "45"]);

    assert_eq!(run_cli_success(dir.path(), &["travel", "Home", "Office"]).trim(), "45");
    assert_eq!(run_cli_success(dir.path(), &["travel", " ", "Office"]).trim(), "45");
}

#[test]
fn test_lists_sends_the_resolved_google_token() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let lists = server
        .mock("GET", "/users/@me/lists")
        .match_header("authorization", "Bearer from-env")
        .match_query(mockito::Matcher::Any)
        .with_body(r#"{"items": [{"id": "l1", "title": "■メモ"}, {"id": "l2", "title": "■Work"}]}"#)
        .expect(1)
        .create();
    std::fs::write(
        dir.path().join("config.toml"),
        format!("[tasks]\napi_base = \"{}\"\n\n[analysis]\nenabled = false\n", server.url()),
    )
    .unwrap();

    let (stdout, stderr, code) = run_cli_with_env(
        dir.path(),
        &["lists"],
        &[("TASKWEAVE_GOOGLE_TOKEN", "from-env")],
    );

    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("inbox (schedulable)"));
    assert!(stdout.contains("■Work"));
    lists.assert();
}

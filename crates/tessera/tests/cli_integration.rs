//! CLI integration tests for the Tessera command-line interface.
//!
//! Every test points `TESSERA_CONFIG_DIR` at a scratch directory so the
//! user's own config and log files are never read or written. Commands that
//! talk to a server run against a wiremock instance.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Get a command for the tessera binary with an isolated config dir.
fn tessera(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tessera").unwrap();
    cmd.env("TESSERA_CONFIG_DIR", config_dir.path())
        .env_remove("TESSERA_SERVER_URL")
        .env_remove("TESSERA_AUTH_TOKEN")
        .env_remove("TESSERA_WORKFLOW_URL")
        .env_remove("RUST_LOG")
        .current_dir(config_dir.path());
    cmd
}

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    tessera(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("dispatch"))
        .stdout(predicate::str::contains("tui"))
        .stdout(predicate::str::contains("workflow"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    tessera(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tessera"));
}

#[test]
fn test_unknown_command_fails() {
    let dir = TempDir::new().unwrap();
    tessera(&dir).arg("frobnicate").assert().failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Validate
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_validate_demo_config() {
    let dir = TempDir::new().unwrap();
    tessera(&dir)
        .arg("validate")
        .arg(demo("pdf-processor.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("pdf-processor"))
        .stdout(predicate::str::contains("3 components"));
}

#[test]
fn test_validate_json_output() {
    let dir = TempDir::new().unwrap();
    tessera(&dir)
        .args(["--json", "validate"])
        .arg(demo("pdf-processor.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"valid\": true"))
        .stdout(predicate::str::contains("\"layout\": \"dashboard\""));
}

#[test]
fn test_validate_rejects_missing_id() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("broken.json");
    std::fs::write(
        &config,
        json!({
            "id": "",
            "version": "1.0",
            "layout": { "type": "single", "components": [] }
        })
        .to_string(),
    )
    .unwrap();

    tessera(&dir).arg("validate").arg(&config).assert().failure();
}

#[test]
fn test_validate_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    tessera(&dir)
        .args(["validate", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.json"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Render
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_render_outline_with_state() {
    let dir = TempDir::new().unwrap();
    tessera(&dir)
        .arg("render")
        .arg(demo("pdf-processor.json"))
        .arg("--state")
        .arg(demo("pdf-processor.state.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("pdf-processor v1.0 (dashboard)"))
        .stdout(predicate::str::contains("Processing Statistics"))
        .stdout(predicate::str::contains("Recent Processes"));
}

#[test]
fn test_render_json_is_a_tree() {
    let dir = TempDir::new().unwrap();
    let output = tessera(&dir)
        .args(["--json", "render"])
        .arg(demo("pdf-processor.json"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["configId"], "pdf-processor");
    assert_eq!(tree["version"], "1.0");
}

#[test]
fn test_render_rejects_non_object_state() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.json");
    std::fs::write(&state, "[1, 2, 3]").unwrap();

    tessera(&dir)
        .arg("render")
        .arg(demo("pdf-processor.json"))
        .arg("--state")
        .arg(&state)
        .assert()
        .failure();
}

#[test]
fn test_role_requires_user() {
    let dir = TempDir::new().unwrap();
    tessera(&dir)
        .arg("render")
        .arg(demo("pdf-processor.json"))
        .args(["--role", "admin"])
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_dispatch_submit_merges_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/automations/pdf-processor/process"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "last_run": "queued" })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        let dir = TempDir::new().unwrap();
        tessera(&dir)
            .args(["--json", "--server", &uri, "dispatch"])
            .arg(demo("pdf-processor.json"))
            .args(["--component", "file-input", "--action", "process"])
            .args(["--input", "source_type=gdrive", "--input", "cloud_path=inbox/a.pdf"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["state"]["last_run"], "queued");
    assert_eq!(body["state"]["cloud_path"], "inbox/a.pdf");
    let changed: Vec<&str> = body["changed"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert!(changed.contains(&"last_run"));
}

#[tokio::test]
async fn test_dispatch_server_error_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/automations/pdf-processor/process"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        let dir = TempDir::new().unwrap();
        tessera(&dir)
            .args(["--server", &uri, "dispatch"])
            .arg(demo("pdf-processor.json"))
            .args(["--component", "file-input", "--action", "process"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(!output.status.success());
}

#[test]
fn test_dispatch_unknown_action_fails() {
    let dir = TempDir::new().unwrap();
    tessera(&dir)
        .arg("dispatch")
        .arg(demo("pdf-processor.json"))
        .args(["--component", "file-input", "--action", "nope"])
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Workflow
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_workflow_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/executions/exec-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "exec-7",
            "namespace": "tessera",
            "flowId": "pdf-processor",
            "state": "SUCCESS",
            "outputs": { "rows": 12 }
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        let dir = TempDir::new().unwrap();
        tessera(&dir)
            .args(["workflow", "--engine", &uri, "status", "exec-7"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("exec-7"));
    assert!(stdout.contains("tessera/pdf-processor"));
}

#[tokio::test]
async fn test_workflow_failed_execution_exits_nonzero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/executions/exec-8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "exec-8",
            "state": "FAILED"
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        let dir = TempDir::new().unwrap();
        tessera(&dir)
            .args(["workflow", "--engine", &uri, "status", "exec-8"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(!output.status.success());
}

// ─────────────────────────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_path_uses_config_dir() {
    let dir = TempDir::new().unwrap();
    tessera(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_local_then_which() {
    let dir = TempDir::new().unwrap();
    tessera(&dir)
        .args(["config", "init", "--local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));
    assert!(dir.path().join("tessera.toml").exists());

    tessera(&dir)
        .args(["config", "init", "--local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    tessera(&dir)
        .args(["config", "which"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ loaded"));
}

#[test]
fn test_config_show_reports_plaintext_token() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("tessera.toml"),
        "[server]\nurl = \"http://apps.internal:9000\"\nauth_token = \"secret\"\n",
    )
    .unwrap();

    tessera(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://apps.internal:9000"))
        .stdout(predicate::str::contains("plaintext"));
}

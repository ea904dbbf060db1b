//! Integration tests for the `smartif` CLI binary.
//!
//! Argument parsing, help, completions, and config handling run with no
//! controller at all. Controller-bound commands run against a wiremock
//! server standing in for the SmartIf HTTP interface.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `smartif` binary with env isolation.
///
/// Clears all `SMARTIF_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn smartif_cmd_in(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("smartif");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("SMARTIF_PROFILE")
        .env_remove("SMARTIF_HOST")
        .env_remove("SMARTIF_PORT")
        .env_remove("SMARTIF_TIMEOUT")
        .env_remove("SMARTIF_OUTPUT")
        .env_remove("SMARTIF_PUSH_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn smartif_cmd() -> assert_cmd::Command {
    smartif_cmd_in(Path::new("/tmp/smartif-cli-test-nonexistent"))
}

/// A command aimed at `server` through `--host`/`--port`.
fn smartif_against(server: &MockServer) -> assert_cmd::Command {
    let addr = server.address();
    let mut cmd = smartif_cmd();
    cmd.args(["--host", &addr.ip().to_string(), "--port", &addr.port().to_string()]);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = smartif_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    smartif_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("SmartIf")
            .and(predicate::str::contains("state"))
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("services")),
    );
}

#[test]
fn test_version_flag() {
    smartif_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("smartif"));
}

#[test]
fn test_completions_bash() {
    smartif_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_cover_position_out_of_range() {
    let output = smartif_cmd()
        .args(["--host", "127.0.0.1", "cover", "position", "c1", "101"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_state_without_config_is_usage_error() {
    let output = smartif_cmd().arg("state").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("config init"), "Expected hint in output:\n{text}");
}

#[test]
fn test_config_path_under_xdg_home() {
    let home = tempfile::tempdir().unwrap();
    smartif_cmd_in(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("smartif").and(predicate::str::contains("config.toml")));
}

#[test]
fn test_config_init_then_show() {
    let home = tempfile::tempdir().unwrap();
    smartif_cmd_in(home.path())
        .args([
            "config",
            "init",
            "--name",
            "cabin",
            "--controller-host",
            "10.0.1.5",
            "--push-url",
            "ws://10.0.1.5:42443/Events",
        ])
        .assert()
        .success();

    let output = smartif_cmd_in(home.path())
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let cfg: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(cfg["default_profile"], "cabin");
    assert_eq!(cfg["profiles"]["cabin"]["host"], "10.0.1.5");
    assert_eq!(cfg["profiles"]["cabin"]["push_url"], "ws://10.0.1.5:42443/Events");
}

#[test]
fn test_config_init_rejects_http_push_url() {
    let home = tempfile::tempdir().unwrap();
    let output = smartif_cmd_in(home.path())
        .args([
            "config",
            "init",
            "--controller-host",
            "10.0.1.5",
            "--push-url",
            "http://10.0.1.5/Events",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unknown_profile() {
    let output = smartif_cmd()
        .args(["--profile", "office", "state"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("office"));
}

// ── Controller-bound commands ───────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_state_prints_snapshot_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/DevicesState"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dev2": {"isOn": false},
            "dev1": {"isOn": true, "brightness": 40}
        })))
        .mount(&server)
        .await;

    let output = smartif_against(&server)
        .args(["-o", "json", "state"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let state: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(state["dev1"]["brightness"], 40);
    assert_eq!(state["dev2"]["isOn"], false);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_state_unknown_key_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/DevicesState"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dev1": {}})))
        .mount(&server)
        .await;

    let output = smartif_against(&server)
        .args(["state", "dev9"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_state_controller_down_is_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/DevicesState"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let output = smartif_against(&server).arg("state").output().unwrap();
    assert_eq!(output.status.code(), Some(7));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_devices_lights_plain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Lights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Kitchen", "id": "l1", "supportsBrightness": true},
            {"name": "Porch", "id": "l2", "supportsBrightness": false}
        ])))
        .mount(&server)
        .await;

    smartif_against(&server)
        .args(["-o", "plain", "devices", "lights"])
        .assert()
        .success()
        .stdout("l1\nl2\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_light_on_with_brightness() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Lights/l1/TurnOn"))
        .and(query_param("brightness", "120"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    smartif_against(&server)
        .args(["light", "on", "l1", "--brightness", "120"])
        .assert()
        .success()
        .stdout(predicate::str::contains("l1: on"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_action_on_missing_entity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Switches/sw9/TurnOff"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let output = smartif_against(&server)
        .args(["switch", "off", "sw9"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_camera_snapshot_writes_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Cameras/cam1/CameraImage"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xD9]),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("door.jpg");
    smartif_against(&server)
        .args(["camera", "snapshot", "cam1", "--file"])
        .arg(&file)
        .assert()
        .success();

    assert_eq!(std::fs::read(&file).unwrap(), vec![0xFF, 0xD8, 0xFF, 0xD9]);
}

//! Integration tests for the `stconf` CLI binary.
//!
//! Parsing, help, completions and error exit codes run without a daemon;
//! the reconciliation tests point the binary at a wiremock daemon.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOCAL: &str = "P56IOI7-MZJNU2Y-IQGDREY-DM2MGTI-MGL3BXN-PQ6W5BM-TBBZ4TJ-XZWICQ2";
const PEER_A: &str = "UJZDEGX-DNCF32H-EPF3DHO-DZDOCIE-S2JHTLG-MXGEDNB-73U55XT-PLPFT7K";
const PEER_B: &str = "V4SEH2K-VJ72CE5-UVW75EF-R6EDT4T-SYWB5WK-H7DNSIE-PZZ7FK4-ZRI3R2F";

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `stconf` binary with env isolation.
///
/// Clears all `STCONF_*` env vars and points home, config and state
/// directories at `home`, so tests never read the user's real stconf
/// config or Syncthing `config.xml`.
fn stconf_cmd_in(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("stconf");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_STATE_HOME", home.join(".local/state"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("STCONF_PROFILE")
        .env_remove("STCONF_HOST")
        .env_remove("STCONF_API_KEY")
        .env_remove("STCONF_DAEMON_CONFIG")
        .env_remove("STCONF_OUTPUT")
        .env_remove("STCONF_INSECURE")
        .env_remove("STCONF_TIMEOUT");
    cmd
}

fn stconf_cmd() -> assert_cmd::Command {
    stconf_cmd_in(Path::new("/tmp/stconf-cli-test-nonexistent"))
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock daemon keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn daemon() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/config"))
        .and(header("X-API-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [
                { "deviceID": LOCAL, "name": "server", "addresses": ["dynamic"], "paused": false },
                { "deviceID": PEER_A, "name": "laptop", "addresses": ["dynamic"], "paused": false }
            ],
            "folders": [{
                "id": "docs",
                "label": "Documents",
                "path": "/srv/docs",
                "devices": [{ "deviceID": LOCAL }, { "deviceID": PEER_A }],
                "paused": false
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/system/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "myID": LOCAL })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/config/restart-required"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "requiresRestart": false })))
        .mount(&server)
        .await;
    server
}

fn daemon_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = stconf_cmd();
    cmd.args(["--host", &server.uri(), "--api-key", "test-key"]);
    cmd
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = stconf_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    stconf_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Syncthing")
            .and(predicate::str::contains("device"))
            .and(predicate::str::contains("folder"))
            .and(predicate::str::contains("apply")),
    );
}

#[test]
fn test_version_flag() {
    stconf_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stconf"));
}

#[test]
fn test_completions_bash() {
    stconf_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_config_path_is_isolated() {
    stconf_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stconf-cli-test-nonexistent"));
}

// ── Error exit codes ────────────────────────────────────────────────

#[test]
fn test_invalid_device_id_is_usage_error() {
    stconf_cmd()
        .args(["device", "--id", "not-a-device"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a device ID"));
}

#[test]
fn test_invalid_address_is_rejected_before_connecting() {
    stconf_cmd()
        .args(["device", "--id", PEER_B, "--address", "http://10.0.0.2"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("addresses"));
}

#[test]
fn test_no_daemon_config_is_discovery_error() {
    stconf_cmd()
        .args(["device", "--id", PEER_B])
        .assert()
        .code(9)
        .stderr(predicate::str::contains("config.xml"));
}

#[test]
fn test_missing_apply_file_is_usage_error() {
    stconf_cmd()
        .args(["apply", "/tmp/stconf-cli-test-nonexistent/desired.yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("desired.yaml"));
}

#[test]
fn test_duplicate_ids_in_batch_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("desired.yaml");
    std::fs::write(
        &file,
        "folders:\n  - id: docs\n    path: /a\n  - id: docs\n    path: /b\n",
    )
    .unwrap();

    stconf_cmd()
        .arg("apply")
        .arg(&file)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("docs"));
}

#[test]
fn test_unknown_profile_is_usage_error() {
    stconf_cmd()
        .args(["--profile", "office", "facts"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("office"));
}

// ── Profiles ────────────────────────────────────────────────────────

#[test]
fn test_set_profile_then_show_masks_key() {
    let home = tempfile::tempdir().unwrap();
    stconf_cmd_in(home.path())
        .args([
            "config",
            "set-profile",
            "nas",
            "--profile-host",
            "https://nas.lan:8384",
            "--profile-api-key",
            "very-secret",
            "--default",
        ])
        .assert()
        .success();

    stconf_cmd_in(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("nas.lan")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("very-secret").not()),
        );
}

#[test]
fn test_malformed_config_is_reported_and_kept() {
    let home = tempfile::tempdir().unwrap();
    let output = stconf_cmd_in(home.path())
        .args(["config", "path"])
        .output()
        .unwrap();
    let config_file = std::path::PathBuf::from(String::from_utf8(output.stdout).unwrap().trim());
    std::fs::create_dir_all(config_file.parent().unwrap()).unwrap();
    let original = "[profiles.nas]\nhost = \"https://nas.lan:8384\"\ntimeout = \"ten\"\n";
    std::fs::write(&config_file, original).unwrap();

    stconf_cmd_in(home.path())
        .arg("facts")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("timeout").and(predicate::str::contains("config.xml").not()));

    stconf_cmd_in(home.path())
        .args([
            "config",
            "set-profile",
            "home",
            "--profile-host",
            "http://127.0.0.1:8384",
        ])
        .assert()
        .code(1);

    assert_eq!(std::fs::read_to_string(&config_file).unwrap(), original);
}

// ── Against a daemon ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_device_create_reports_json() {
    let server = daemon().await;
    Mock::given(method("PUT"))
        .and(path(format!("/rest/config/devices/{PEER_B}")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = daemon_cmd(&server);
    cmd.args(["-o", "json", "device", "--id", PEER_B, "--name", "phone"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["changed"], true);
    assert_eq!(report["outcomes"][0]["action"], "create");
    assert_eq!(report["outcomes"][0]["state"], "present_active");
    assert_eq!(report["outcomes"][0]["entity"]["name"], "phone");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_check_mode_never_writes() {
    let server = daemon().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = daemon_cmd(&server);
    cmd.args([
        "--check", "--diff", "folder", "--id", "docs", "--label", "Docs", "--no-devices",
    ]);
    let output = run(cmd).await;
    let text = combined_output(&output);
    assert!(output.status.success(), "{text}");
    assert!(text.contains("check mode"), "{text}");
    assert!(text.contains("+label: Docs"), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_converged_apply_is_unchanged() {
    let server = daemon().await;
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("desired.json");
    std::fs::write(
        &file,
        json!({
            "devices": [{ "id": PEER_A, "name": "laptop" }],
            "folders": [{ "id": "docs", "devices": ["laptop"] }]
        })
        .to_string(),
    )
    .unwrap();

    let mut cmd = daemon_cmd(&server);
    cmd.args(["-o", "plain", "apply"]).arg(&file);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("device\t{PEER_A}\tnone")), "{stdout}");
    assert!(stdout.contains("folder\tdocs\tnone"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_write_exits_one() {
    let server = daemon().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut cmd = daemon_cmd(&server);
    cmd.args(["device", "--id", PEER_B]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(1), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("1 of 1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_api_key_exits_three() {
    let server = daemon().await;
    Mock::given(method("GET"))
        .and(path("/rest/config"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let mut cmd = stconf_cmd();
    cmd.args(["--host", &server.uri(), "--api-key", "wrong", "facts"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_facts_from_discovered_daemon_config() {
    let server = daemon().await;
    let dir = tempfile::tempdir().unwrap();
    let config_xml = dir.path().join("config.xml");
    std::fs::write(
        &config_xml,
        format!(
            "<configuration><gui tls=\"false\"><address>{}</address><apikey>test-key</apikey></gui></configuration>",
            server.address()
        ),
    )
    .unwrap();

    let mut cmd = stconf_cmd();
    cmd.args(["-o", "json", "facts", "--daemon-config"]).arg(&config_xml);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let facts: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(facts["local_id"], LOCAL);
    assert_eq!(facts["api_key"], "****");
    assert_eq!(facts["devices"].as_array().unwrap().len(), 2);
    assert_eq!(facts["folders"][0]["id"], "docs");
}

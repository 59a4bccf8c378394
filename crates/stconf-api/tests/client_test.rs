#![allow(clippy::unwrap_used)]
// Integration tests for `SyncthingClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Map, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stconf_api::{DeviceConfiguration, Error, SyncthingClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

const DEVICE_ID: &str = "MFZWI3D-BONSGYC-YLTMRWG-C43ENR5-QXGZDMM-FZWI3DP-BONSGYY-LTMRWAD";

async fn setup() -> (MockServer, SyncthingClient) {
    let server = MockServer::start().await;
    let client = SyncthingClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

async fn mount_restart_probe(server: &MockServer, required: bool) {
    Mock::given(method("GET"))
        .and(path("/rest/config/restart-required"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requiresRestart": required
        })))
        .mount(server)
        .await;
}

fn laptop() -> DeviceConfiguration {
    DeviceConfiguration {
        device_id: DEVICE_ID.into(),
        name: "laptop".into(),
        addresses: vec!["dynamic".into()],
        paused: false,
        extra: Map::new(),
    }
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_api_key_header_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/system/status"))
        .and(header("X-API-Key", "s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "myID": DEVICE_ID,
            "uptime": 42
        })))
        .expect(1)
        .mount(&server)
        .await;

    let key = SecretString::from("s3cret".to_string());
    let client =
        SyncthingClient::from_api_key(&server.uri(), &key, &TransportConfig::default()).unwrap();

    let status = client.system_status().await.unwrap();
    assert_eq!(status.my_id, DEVICE_ID);
}

#[tokio::test]
async fn test_forbidden_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/config"))
        .respond_with(ResponseTemplate::new(403).set_body_string("CSRF Error"))
        .mount(&server)
        .await;

    let result = client.config().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

// ── Configuration reads ─────────────────────────────────────────────

#[tokio::test]
async fn test_config_lists_devices_and_folders() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": 37,
            "devices": [{
                "deviceID": DEVICE_ID,
                "name": "laptop",
                "addresses": ["tcp://10.0.0.2:22000", "dynamic"],
                "paused": true,
                "compression": "metadata"
            }],
            "folders": [{
                "id": "docs",
                "label": "Documents",
                "path": "/home/u/Documents",
                "devices": [{ "deviceID": DEVICE_ID, "introducedBy": "" }],
                "paused": false,
                "type": "sendreceive"
            }],
            "gui": { "address": "127.0.0.1:8384" }
        })))
        .mount(&server)
        .await;

    let config = client.config().await.unwrap();

    assert_eq!(config.devices.len(), 1);
    assert_eq!(config.devices[0].name, "laptop");
    assert_eq!(
        config.devices[0].addresses,
        vec!["tcp://10.0.0.2:22000".to_string(), "dynamic".to_string()]
    );
    assert!(config.devices[0].paused);
    assert_eq!(config.folders[0].path, "/home/u/Documents");
    assert_eq!(config.folders[0].devices[0].device_id, DEVICE_ID);
    assert_eq!(config.folders[0].extra.get("type"), Some(&json!("sendreceive")));
}

#[tokio::test]
async fn test_config_falls_back_to_system_config() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/config"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/system/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [],
            "folders": [{ "id": "legacy", "path": "/srv/legacy" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = client.config().await.unwrap();
    assert_eq!(config.folders[0].id, "legacy");
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/config"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    match client.config().await {
        Err(Error::Deserialization { body, .. }) => assert!(body.contains("oops")),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_folder_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/config/folders/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    assert!(client.folder("nope").await.unwrap().is_none());
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_put_device_sends_body_without_signal() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path(format!("/rest/config/devices/{DEVICE_ID}")))
        .and(body_json(json!({
            "deviceID": DEVICE_ID,
            "name": "laptop",
            "addresses": ["dynamic"],
            "paused": false
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/config/restart-required"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    client.put_device(&laptop()).await.unwrap();
}

#[tokio::test]
async fn test_put_device_rejected_is_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path(format!("/rest/config/devices/{DEVICE_ID}")))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid device ID"))
        .mount(&server)
        .await;

    match client.put_device(&laptop()).await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("invalid device ID"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_missing_folder_is_tolerated() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/config/folders/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(!client.delete_folder("gone").await.unwrap());
}

#[tokio::test]
async fn test_delete_device_then_signal_apply() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/rest/config/devices/{DEVICE_ID}")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    mount_restart_probe(&server, true).await;

    assert!(client.delete_device(DEVICE_ID).await.unwrap());
    assert!(client.signal_apply().await.unwrap().restart_required);
}

#[tokio::test]
async fn test_apply_signal_http_error_is_ignored() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/config/restart-required"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let signal = client.signal_apply().await.unwrap();
    assert!(!signal.restart_required);
}

#[tokio::test]
async fn test_restart_posts() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/system/restart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": "restarting" })))
        .expect(1)
        .mount(&server)
        .await;

    client.restart().await.unwrap();
}

// ── Transport ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Port 1 (tcpmux) is closed on any sane test host.
    let client =
        SyncthingClient::from_reqwest("http://127.0.0.1:1", reqwest::Client::new()).unwrap();

    let result = client.config().await;
    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error, got: {result:?}"
    );
}

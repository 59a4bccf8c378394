// Syncthing REST response types
//
// Wire models for the configuration endpoints. Only the fields the
// reconciler manages are modeled explicitly; everything else the daemon
// sends lands in `extra` and is written back verbatim, so a PUT never
// resets settings this tool does not own.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Full configuration ───────────────────────────────────────────────

/// The daemon's full configuration (`GET /rest/config`).
///
/// Only the device and folder lists are decoded; GUI, options and the
/// rest are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub devices: Vec<DeviceConfiguration>,
    #[serde(default)]
    pub folders: Vec<FolderConfiguration>,
}

// ── Device ───────────────────────────────────────────────────────────

/// One entry of `devices` / `GET /rest/config/devices/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfiguration {
    #[serde(rename = "deviceID")]
    pub device_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default)]
    pub paused: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Folder ───────────────────────────────────────────────────────────

/// A folder's membership entry for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderDeviceConfiguration {
    #[serde(rename = "deviceID")]
    pub device_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of `folders` / `GET /rest/config/folders/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderConfiguration {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub devices: Vec<FolderDeviceConfiguration>,
    #[serde(default)]
    pub paused: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── System ───────────────────────────────────────────────────────────

/// Subset of `GET /rest/system/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemStatus {
    /// The local daemon's own device ID.
    #[serde(rename = "myID")]
    pub my_id: String,
}

/// `GET /rest/config/restart-required`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RestartRequired {
    #[serde(rename = "requiresRestart", default)]
    pub requires_restart: bool,
}

// ── Desired state ──
//
// What the operator asks for. Specs are parsed from CLI flags or from a
// YAML/JSON batch file; `validate` checks everything that does not need
// the daemon before any request is made.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

use crate::error::CoreError;
use crate::model::DeviceId;

/// Requested lifecycle state of one entity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TargetState {
    #[default]
    Present,
    #[serde(alias = "paused")]
    #[strum(to_string = "pause", serialize = "paused")]
    Pause,
    Absent,
}

/// Desired configuration of one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceSpec {
    pub id: DeviceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<String>>,
    #[serde(default)]
    pub state: TargetState,
}

/// Address schemes the daemon dials.
const ADDRESS_SCHEMES: &[&str] = &["tcp", "tcp4", "tcp6", "quic", "quic4", "quic6", "relay"];

impl DeviceSpec {
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            name: None,
            addresses: None,
            state: TargetState::Present,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.state == TargetState::Absent {
            return Ok(());
        }
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(CoreError::validation("name", "must not be empty"));
        }
        if let Some(addresses) = &self.addresses {
            if addresses.is_empty() {
                return Err(CoreError::validation(
                    "addresses",
                    "must list at least one address (use \"dynamic\" for discovery)",
                ));
            }
            for address in addresses {
                validate_address(address)?;
            }
        }
        Ok(())
    }
}

fn validate_address(address: &str) -> Result<(), CoreError> {
    if address == "dynamic" {
        return Ok(());
    }
    let url = Url::parse(address).map_err(|e| {
        CoreError::validation("addresses", format!("'{address}' is not a URL: {e}"))
    })?;
    if !ADDRESS_SCHEMES.contains(&url.scheme()) {
        return Err(CoreError::validation(
            "addresses",
            format!(
                "'{address}' uses unsupported scheme '{}' (expected one of: {})",
                url.scheme(),
                ADDRESS_SCHEMES.join(", ")
            ),
        ));
    }
    if url.host().is_none() {
        return Err(CoreError::validation(
            "addresses",
            format!("'{address}' has no host"),
        ));
    }
    Ok(())
}

/// Desired configuration of one folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FolderSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Peer devices, by ID or by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<String>>,
    #[serde(default)]
    pub state: TargetState,
}

impl FolderSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: None,
            label: None,
            devices: None,
            state: TargetState::Present,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.id.is_empty() {
            return Err(CoreError::validation("id", "folder ID must not be empty"));
        }
        if self.id.trim() != self.id {
            return Err(CoreError::validation(
                "id",
                format!("folder ID '{}' has surrounding whitespace", self.id),
            ));
        }
        if self.state == TargetState::Absent {
            return Ok(());
        }
        if self.path.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(CoreError::validation("path", "must not be empty"));
        }
        let devices = self.devices.as_deref().unwrap_or_default();
        if devices.iter().any(|d| d.trim().is_empty()) {
            return Err(CoreError::validation(
                "devices",
                "entries must be device IDs or names, not empty strings",
            ));
        }
        Ok(())
    }
}

/// A batch of specs, as read by `stconf apply`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesiredState {
    #[serde(default)]
    pub devices: Vec<DeviceSpec>,
    #[serde(default)]
    pub folders: Vec<FolderSpec>,
}

impl DesiredState {
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.folders.is_empty()
    }

    /// Validate every spec and reject duplicate IDs within the batch.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut seen = HashSet::new();
        for spec in &self.devices {
            spec.validate()?;
            if !seen.insert(&spec.id) {
                return Err(CoreError::validation(
                    "devices",
                    format!("device {} is declared more than once", spec.id),
                ));
            }
        }

        let mut seen = HashSet::new();
        for spec in &self.folders {
            spec.validate()?;
            if !seen.insert(spec.id.as_str()) {
                return Err(CoreError::validation(
                    "folders",
                    format!("folder '{}' is declared more than once", spec.id),
                ));
            }
        }
        Ok(())
    }
}

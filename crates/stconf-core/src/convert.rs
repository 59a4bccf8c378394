// ── API-to-domain type conversions ──
//
// Bridges raw `stconf_api` wire types into domain model types and back.
// Unmanaged fields travel through untouched in both directions.

use stconf_api::{
    Configuration, DeviceConfiguration, FolderConfiguration, FolderDeviceConfiguration,
    SystemStatus,
};

use crate::error::CoreError;
use crate::model::{ConfigSnapshot, Device, DeviceId, Folder, FolderMember};

fn parse_id(raw: &str, context: &str) -> Result<DeviceId, CoreError> {
    raw.parse().map_err(|e| CoreError::Parse {
        message: format!("{context} has unusable device ID '{raw}': {e}"),
    })
}

// ── Device ───────────────────────────────────────────────────────────

impl TryFrom<DeviceConfiguration> for Device {
    type Error = CoreError;

    fn try_from(d: DeviceConfiguration) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&d.device_id, "device entry")?,
            name: d.name,
            addresses: d.addresses,
            paused: d.paused,
            unmanaged: d.extra,
        })
    }
}

impl From<&Device> for DeviceConfiguration {
    fn from(d: &Device) -> Self {
        Self {
            device_id: d.id.to_string(),
            name: d.name.clone(),
            addresses: d.addresses.clone(),
            paused: d.paused,
            extra: d.unmanaged.clone(),
        }
    }
}

// ── Folder ───────────────────────────────────────────────────────────

impl TryFrom<FolderConfiguration> for Folder {
    type Error = CoreError;

    fn try_from(f: FolderConfiguration) -> Result<Self, Self::Error> {
        let context = format!("folder '{}'", f.id);
        let devices = f
            .devices
            .into_iter()
            .map(|m| {
                Ok(FolderMember {
                    id: parse_id(&m.device_id, &context)?,
                    unmanaged: m.extra,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        Ok(Self {
            id: f.id,
            label: f.label,
            path: f.path,
            devices,
            paused: f.paused,
            unmanaged: f.extra,
        })
    }
}

impl From<&Folder> for FolderConfiguration {
    fn from(f: &Folder) -> Self {
        Self {
            id: f.id.clone(),
            label: f.label.clone(),
            path: f.path.clone(),
            devices: f
                .devices
                .iter()
                .map(|m| FolderDeviceConfiguration {
                    device_id: m.id.to_string(),
                    extra: m.unmanaged.clone(),
                })
                .collect(),
            paused: f.paused,
            extra: f.unmanaged.clone(),
        }
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────

impl ConfigSnapshot {
    /// Build a snapshot from the daemon's configuration and status.
    pub fn from_api(config: Configuration, status: Option<&SystemStatus>) -> Result<Self, CoreError> {
        let local_id = status
            .map(|s| parse_id(&s.my_id, "system status"))
            .transpose()?;
        let devices = config
            .devices
            .into_iter()
            .map(Device::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let folders = config
            .folders
            .into_iter()
            .map(Folder::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(local_id, devices, folders))
    }
}

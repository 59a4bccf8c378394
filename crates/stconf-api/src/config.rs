// Configuration endpoints
//
// Per-object reads and writes under /rest/config/. Writes do not send the
// apply signal themselves; the caller issues `signal_apply` after each one
// so a failed signal is never mistaken for a failed write.

use tracing::{debug, warn};

use crate::client::SyncthingClient;
use crate::error::Error;
use crate::models::{Configuration, DeviceConfiguration, FolderConfiguration, RestartRequired};

/// What the daemon reported after a configuration write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySignal {
    /// The daemon accepted the change but needs a restart to run it.
    pub restart_required: bool,
}

impl SyncthingClient {
    /// Fetch the full configuration.
    ///
    /// `GET /rest/config`, falling back to the pre-1.12
    /// `GET /rest/system/config` when the daemon does not know the former.
    pub async fn config(&self) -> Result<Configuration, Error> {
        match self.get(self.url(&["config"])?).await {
            Err(e) if e.is_not_found() => {
                debug!("/rest/config unavailable, falling back to /rest/system/config");
                self.get(self.url(&["system", "config"])?).await
            }
            other => other,
        }
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// `GET /rest/config/devices/{id}`; `None` if the daemon has no such device.
    pub async fn device(&self, device_id: &str) -> Result<Option<DeviceConfiguration>, Error> {
        self.get_optional(self.url(&["config", "devices", device_id])?)
            .await
    }

    /// Create or replace a device.
    ///
    /// `PUT /rest/config/devices/{id}`
    pub async fn put_device(&self, device: &DeviceConfiguration) -> Result<(), Error> {
        let url = self.url(&["config", "devices", &device.device_id])?;
        debug!(device_id = %device.device_id, "writing device");
        self.put(url, device).await
    }

    /// Remove a device.
    ///
    /// `DELETE /rest/config/devices/{id}`. Returns `false` when the device
    /// was already gone and nothing was written.
    pub async fn delete_device(&self, device_id: &str) -> Result<bool, Error> {
        let url = self.url(&["config", "devices", device_id])?;
        debug!(device_id, "removing device");
        self.delete(url).await
    }

    // ── Folders ──────────────────────────────────────────────────────

    /// `GET /rest/config/folders/{id}`; `None` if the daemon has no such folder.
    pub async fn folder(&self, folder_id: &str) -> Result<Option<FolderConfiguration>, Error> {
        self.get_optional(self.url(&["config", "folders", folder_id])?)
            .await
    }

    /// Create or replace a folder.
    ///
    /// `PUT /rest/config/folders/{id}`
    pub async fn put_folder(&self, folder: &FolderConfiguration) -> Result<(), Error> {
        let url = self.url(&["config", "folders", &folder.id])?;
        debug!(folder_id = %folder.id, "writing folder");
        self.put(url, folder).await
    }

    /// Remove a folder's sharing configuration. Files on disk are untouched.
    ///
    /// `DELETE /rest/config/folders/{id}`. Returns `false` when the folder
    /// was already gone.
    pub async fn delete_folder(&self, folder_id: &str) -> Result<bool, Error> {
        let url = self.url(&["config", "folders", folder_id])?;
        debug!(folder_id, "removing folder");
        self.delete(url).await
    }

    // ── Apply signal ─────────────────────────────────────────────────

    /// Ask the daemon whether the last change needs a restart. Sent after
    /// every successful write.
    ///
    /// `GET /rest/config/restart-required`. Any HTTP-level answer other
    /// than success is logged and treated as "no restart needed"; only a
    /// transport failure is surfaced.
    pub async fn signal_apply(&self) -> Result<ApplySignal, Error> {
        let url = self.url(&["config", "restart-required"])?;
        match self.get::<RestartRequired>(url).await {
            Ok(answer) => Ok(ApplySignal {
                restart_required: answer.requires_restart,
            }),
            Err(e) if e.is_transport() => Err(e),
            Err(e) => {
                warn!(error = %e, "apply signal not acknowledged (ignored)");
                Ok(ApplySignal::default())
            }
        }
    }
}

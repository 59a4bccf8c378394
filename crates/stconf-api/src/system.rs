// System endpoints
//
// Daemon-level reads and the restart request.

use tracing::{debug, warn};

use crate::client::SyncthingClient;
use crate::error::Error;
use crate::models::SystemStatus;

impl SyncthingClient {
    /// Get the daemon status, chiefly the local device ID.
    ///
    /// `GET /rest/system/status`
    pub async fn system_status(&self) -> Result<SystemStatus, Error> {
        debug!("fetching system status");
        self.get(self.url(&["system", "status"])?).await
    }

    /// Ask the daemon to restart.
    ///
    /// `POST /rest/system/restart`. Fire-and-forget: a non-success answer is
    /// logged, a transport failure is returned.
    pub async fn restart(&self) -> Result<(), Error> {
        match self.post_empty(self.url(&["system", "restart"])?).await {
            Err(e) if e.is_transport() => Err(e),
            Err(e) => {
                warn!(error = %e, "restart request not acknowledged (ignored)");
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }
}

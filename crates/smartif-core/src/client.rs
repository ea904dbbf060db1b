// ── Controller client seam ──
//
// The poller and the session only need two calls from the network side.
// `SmartIfClient` implements them over HTTP; tests plug in fakes.

use std::future::Future;

use smartif_api::SmartIfClient;

use crate::error::CoreError;
use crate::key::{Snapshot, snapshot_from_raw};

/// What the core needs from a controller connection.
pub trait ControllerClient: Send + Sync + 'static {
    /// Fetch the full device-state snapshot.
    fn fetch_snapshot(&self) -> impl Future<Output = Result<Snapshot, CoreError>> + Send;

    /// Perform a device action such as `Lights/kitchen/TurnOn`.
    fn perform_action(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl ControllerClient for SmartIfClient {
    async fn fetch_snapshot(&self) -> Result<Snapshot, CoreError> {
        let raw = self.devices_state().await?;
        Ok(snapshot_from_raw(raw))
    }

    async fn perform_action(&self, path: &str, params: &[(&str, String)]) -> Result<(), CoreError> {
        SmartIfClient::perform_action(self, path, params).await?;
        Ok(())
    }
}

// Cover endpoints: open, close, stop, and positioning.

use tracing::debug;

use crate::client::SmartIfClient;
use crate::error::Error;
use crate::types::CoverInfo;

impl SmartIfClient {
    /// List all covers.
    ///
    /// `GET Covers`
    pub async fn list_covers(&self) -> Result<Vec<CoverInfo>, Error> {
        let url = self.endpoint(&["Covers"], &[])?;
        self.get_json(url).await
    }

    /// `POST Covers/{id}/OpenCover`
    pub async fn open_cover(&self, id: &str) -> Result<(), Error> {
        self.cover_action(id, "OpenCover").await
    }

    /// `POST Covers/{id}/CloseCover`
    pub async fn close_cover(&self, id: &str) -> Result<(), Error> {
        self.cover_action(id, "CloseCover").await
    }

    /// `POST Covers/{id}/StopCover`
    pub async fn stop_cover(&self, id: &str) -> Result<(), Error> {
        self.cover_action(id, "StopCover").await
    }

    /// Move a cover to `position`, where 0 is closed and 100 fully open.
    ///
    /// `POST Covers/{id}/SetCoverPosition?position=`
    pub async fn set_cover_position(&self, id: &str, position: u8) -> Result<(), Error> {
        let url = self.endpoint(
            &["Covers", id, "SetCoverPosition"],
            &[("position", position.to_string())],
        )?;
        debug!(id, position, "positioning cover");
        self.post(url).await
    }

    async fn cover_action(&self, id: &str, action: &str) -> Result<(), Error> {
        let url = self.endpoint(&["Covers", id, action], &[])?;
        debug!(id, action, "cover action");
        self.post(url).await
    }
}

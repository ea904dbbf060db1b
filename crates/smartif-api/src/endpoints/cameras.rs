use bytes::Bytes;
use tracing::debug;

use crate::client::SmartIfClient;
use crate::error::Error;
use crate::types::EntityInfo;

impl SmartIfClient {
    /// `GET Cameras`
    pub async fn list_cameras(&self) -> Result<Vec<EntityInfo>, Error> {
        let url = self.endpoint(&["Cameras"], &[])?;
        self.get_json(url).await
    }

    /// Fetch the current still image of a camera.
    ///
    /// `GET Cameras/{id}/CameraImage`
    pub async fn camera_image(&self, id: &str) -> Result<Bytes, Error> {
        let url = self.endpoint(&["Cameras", id, "CameraImage"], &[])?;
        debug!(id, "fetching camera image");
        self.request_binary(url).await
    }
}

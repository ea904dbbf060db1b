use crate::client::SmartIfClient;
use crate::error::Error;
use crate::types::BinarySensorInfo;

impl SmartIfClient {
    /// `GET BinarySensors`
    pub async fn list_binary_sensors(&self) -> Result<Vec<BinarySensorInfo>, Error> {
        let url = self.endpoint(&["BinarySensors"], &[])?;
        self.get_json(url).await
    }
}

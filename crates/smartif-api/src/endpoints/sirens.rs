use tracing::debug;

use crate::client::SmartIfClient;
use crate::error::Error;
use crate::types::EntityInfo;

impl SmartIfClient {
    /// `GET Sirens`
    pub async fn list_sirens(&self) -> Result<Vec<EntityInfo>, Error> {
        let url = self.endpoint(&["Sirens"], &[])?;
        self.get_json(url).await
    }

    /// `POST Sirens/{id}/TurnOn` or `TurnOff`
    pub async fn set_siren(&self, id: &str, on: bool) -> Result<(), Error> {
        let action = if on { "TurnOn" } else { "TurnOff" };
        let url = self.endpoint(&["Sirens", id, action], &[])?;
        debug!(id, action, "siren action");
        self.post(url).await
    }
}

use tracing::debug;

use crate::client::SmartIfClient;
use crate::error::Error;
use crate::types::SwitchInfo;

impl SmartIfClient {
    /// `GET Switches`
    pub async fn list_switches(&self) -> Result<Vec<SwitchInfo>, Error> {
        let url = self.endpoint(&["Switches"], &[])?;
        self.get_json(url).await
    }

    /// `POST Switches/{id}/TurnOn` or `TurnOff`
    pub async fn set_switch(&self, id: &str, on: bool) -> Result<(), Error> {
        let action = if on { "TurnOn" } else { "TurnOff" };
        let url = self.endpoint(&["Switches", id, action], &[])?;
        debug!(id, action, "switch action");
        self.post(url).await
    }
}

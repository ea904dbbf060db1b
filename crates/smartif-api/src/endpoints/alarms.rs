// Alarm control panel endpoints.

use tracing::debug;

use crate::client::SmartIfClient;
use crate::error::Error;
use crate::types::{AlarmCommand, EntityInfo};

impl SmartIfClient {
    /// `GET AlarmControlPanels`
    pub async fn list_alarm_panels(&self) -> Result<Vec<EntityInfo>, Error> {
        let url = self.endpoint(&["AlarmControlPanels"], &[])?;
        self.get_json(url).await
    }

    /// Arm or disarm a panel, passing the user code when one is given.
    ///
    /// `POST AlarmControlPanels/{id}/{AlarmDisarm|AlarmArmHome|AlarmArmAway}[?code=]`
    pub async fn alarm_command(
        &self,
        id: &str,
        command: AlarmCommand,
        code: Option<&str>,
    ) -> Result<(), Error> {
        let query: Vec<(&str, String)> = code
            .map(|c| ("code", c.to_owned()))
            .into_iter()
            .collect();
        let action = command.to_string();
        let url = self.endpoint(&["AlarmControlPanels", id, &action], &query)?;
        debug!(id, %command, "alarm panel command");
        self.post(url).await
    }
}

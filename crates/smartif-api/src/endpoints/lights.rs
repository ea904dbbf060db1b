// Light endpoints: listing, on/off with optional brightness.

use tracing::debug;

use crate::client::SmartIfClient;
use crate::error::Error;
use crate::types::LightInfo;

impl SmartIfClient {
    /// List all lights.
    ///
    /// `GET Lights`
    pub async fn list_lights(&self) -> Result<Vec<LightInfo>, Error> {
        let url = self.endpoint(&["Lights"], &[])?;
        self.get_json(url).await
    }

    /// Turn a light on, optionally at a brightness between 0 and 255.
    ///
    /// `POST Lights/{id}/TurnOn[?brightness=]`
    pub async fn light_turn_on(&self, id: &str, brightness: Option<u8>) -> Result<(), Error> {
        let query: Vec<(&str, String)> = brightness
            .map(|b| ("brightness", b.to_string()))
            .into_iter()
            .collect();
        let url = self.endpoint(&["Lights", id, "TurnOn"], &query)?;
        debug!(id, ?brightness, "turning light on");
        self.post(url).await
    }

    /// `POST Lights/{id}/TurnOff`
    pub async fn light_turn_off(&self, id: &str) -> Result<(), Error> {
        let url = self.endpoint(&["Lights", id, "TurnOff"], &[])?;
        debug!(id, "turning light off");
        self.post(url).await
    }
}

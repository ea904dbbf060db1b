// Climate endpoints: HVAC mode, fan mode, target temperature.

use tracing::debug;

use crate::client::SmartIfClient;
use crate::error::Error;
use crate::types::ClimateInfo;

impl SmartIfClient {
    /// List all climate entities.
    ///
    /// `GET Climates`
    pub async fn list_climates(&self) -> Result<Vec<ClimateInfo>, Error> {
        let url = self.endpoint(&["Climates"], &[])?;
        self.get_json(url).await
    }

    /// `POST Climates/{id}/SetHvacMode?hvacMode=`
    pub async fn set_hvac_mode(&self, id: &str, hvac_mode: &str) -> Result<(), Error> {
        let url = self.endpoint(
            &["Climates", id, "SetHvacMode"],
            &[("hvacMode", hvac_mode.to_owned())],
        )?;
        debug!(id, hvac_mode, "setting hvac mode");
        self.post(url).await
    }

    /// `POST Climates/{id}/SetFanMode?fanMode=`
    pub async fn set_fan_mode(&self, id: &str, fan_mode: &str) -> Result<(), Error> {
        let url = self.endpoint(
            &["Climates", id, "SetFanMode"],
            &[("fanMode", fan_mode.to_owned())],
        )?;
        debug!(id, fan_mode, "setting fan mode");
        self.post(url).await
    }

    /// `POST Climates/{id}/SetTemperature?temperature=`
    pub async fn set_temperature(&self, id: &str, temperature: f64) -> Result<(), Error> {
        let url = self.endpoint(
            &["Climates", id, "SetTemperature"],
            &[("temperature", temperature.to_string())],
        )?;
        debug!(id, temperature, "setting target temperature");
        self.post(url).await
    }
}

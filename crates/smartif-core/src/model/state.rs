// ── Typed state views ──
//
// Projections of schema-free blobs, one per device family. Fields the
// controller may omit are `Option`. Unknown extra fields are ignored.

use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightState {
    pub is_on: bool,
    /// 0..=255, only for dimmable lights.
    #[serde(default)]
    pub brightness: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverState {
    /// 0 is closed, 100 fully open.
    #[serde(default)]
    pub current_cover_position: Option<u8>,
    #[serde(default)]
    pub is_opening: Option<bool>,
    #[serde(default)]
    pub is_closing: Option<bool>,
    pub is_closed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateState {
    pub target_temperature: f64,
    pub hvac_mode: String,
    pub fan_mode: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchState {
    pub is_on: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SirenState {
    pub is_on: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinarySensorState {
    pub is_on: bool,
}

/// Alarm panel states reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlarmState {
    Disarmed,
    Pending,
    Triggered,
    Arming,
    ArmedHome,
    ArmedAway,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmControlPanelState {
    pub state: AlarmState,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn light_without_brightness() {
        let s: LightState = serde_json::from_value(json!({"isOn": true})).unwrap();
        assert!(s.is_on);
        assert!(s.brightness.is_none());
    }

    #[test]
    fn cover_with_partial_motion_fields() {
        let s: CoverState =
            serde_json::from_value(json!({"isClosed": false, "currentCoverPosition": 40}))
                .unwrap();
        assert_eq!(s.current_cover_position, Some(40));
        assert!(s.is_opening.is_none());
    }

    #[test]
    fn climate_requires_all_fields() {
        let err = serde_json::from_value::<ClimateState>(json!({"hvacMode": "heat"}));
        assert!(err.is_err());
    }

    #[test]
    fn alarm_state_names() {
        let s: AlarmControlPanelState =
            serde_json::from_value(json!({"state": "armed_home"})).unwrap();
        assert_eq!(s.state, AlarmState::ArmedHome);
        assert_eq!(s.state.to_string(), "armed_home");

        let s: AlarmControlPanelState =
            serde_json::from_value(json!({"state": "maintenance"})).unwrap();
        assert_eq!(s.state, AlarmState::Unknown);
    }
}

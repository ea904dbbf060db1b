// SmartIf entity descriptors
//
// Static per-entity information returned by the per-kind listing endpoints
// (`GET Lights`, `GET Covers`, ...). Live state is NOT here -- it arrives
// through `DevicesState` and the push channel as schema-free blobs.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The device families exposed by a controller.
///
/// The `Display` form is the URL path segment of the family's endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum DeviceKind {
    #[strum(serialize = "Lights", ascii_case_insensitive)]
    Light,
    #[strum(serialize = "Covers", ascii_case_insensitive)]
    Cover,
    #[strum(serialize = "Climates", ascii_case_insensitive)]
    Climate,
    #[strum(serialize = "Switches", ascii_case_insensitive)]
    Switch,
    #[strum(serialize = "Sirens", ascii_case_insensitive)]
    Siren,
    #[strum(serialize = "AlarmControlPanels", ascii_case_insensitive)]
    AlarmControlPanel,
    #[strum(serialize = "BinarySensors", ascii_case_insensitive)]
    BinarySensor,
    #[strum(serialize = "Cameras", ascii_case_insensitive)]
    Camera,
}

/// Fields every entity descriptor carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub name: String,
    /// Device-key: also the key of this entity in `DevicesState`.
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightInfo {
    pub name: String,
    pub id: String,
    pub supports_brightness: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinarySensorInfo {
    pub name: String,
    pub id: String,
    pub device_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateInfo {
    pub name: String,
    pub id: String,
    pub supports_state: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverInfo {
    pub name: String,
    pub id: String,
    /// e.g. `DEVICE_CLASS_BLIND`, `DEVICE_CLASS_GARAGE`.
    pub device_class: String,
    pub supports_set_position: bool,
    pub supports_stop: bool,
    pub supports_close: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchInfo {
    pub name: String,
    pub id: String,
    pub device_class: String,
}

/// Alarm panel arm/disarm variants, mapped to their action path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AlarmCommand {
    #[strum(serialize = "AlarmDisarm")]
    Disarm,
    #[strum(serialize = "AlarmArmHome")]
    ArmHome,
    #[strum(serialize = "AlarmArmAway")]
    ArmAway,
}

// ── Typed device views ──
//
// The store keeps blobs schema-free; observers project them here.

pub mod entity;
pub mod state;

pub use entity::DeviceEntity;
pub use state::{
    AlarmControlPanelState, AlarmState, BinarySensorState, ClimateState, CoverState, LightState,
    SirenState, SwitchState,
};

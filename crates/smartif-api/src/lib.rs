// smartif-api: Async Rust client for the SmartIf controller (HTTP + push channel)

pub mod client;
pub mod endpoints;
pub mod error;
pub mod push;
pub mod transport;
pub mod types;

pub use client::{Payload, RawSnapshot, SmartIfClient, base_url_for};
pub use endpoints::service_slug;
pub use error::Error;
pub use transport::{DEFAULT_PORT, DEFAULT_TIMEOUT, TransportConfig};
pub use types::{
    AlarmCommand, BinarySensorInfo, ClimateInfo, CoverInfo, DeviceKind, EntityInfo, LightInfo,
    SwitchInfo,
};

// Per-family endpoint groups
//
// Each module adds inherent methods to `SmartIfClient` for one device
// family: a listing call plus the family's action requests.

mod alarms;
mod binary_sensors;
mod cameras;
mod climates;
mod covers;
mod lights;
mod services;
mod sirens;
mod switches;

pub use services::service_slug;

// smartif-core: Device-state store and update reconciliation between smartif-api and consumers.

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod key;
pub mod listener;
pub mod model;
pub mod poll;
pub mod session;
pub mod store;

#[cfg(test)]
mod test_support;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bridge::{EventBridge, PushMessage, push_messages};
pub use client::ControllerClient;
pub use config::SessionConfig;
pub use error::CoreError;
pub use key::{DeviceKey, PartialUpdate, Snapshot, StateBlob};
pub use listener::{ListenerError, ListenerRegistry, Subscription, SubscriptionGuard};
pub use poll::{PollCoordinator, PollSettings, PollState};
pub use session::Session;
pub use store::StateStore;

pub use model::{
    AlarmControlPanelState, AlarmState, BinarySensorState, ClimateState, CoverState,
    DeviceEntity, LightState, SirenState, SwitchState,
};

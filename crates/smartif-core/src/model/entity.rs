// ── Typed device handle ──

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::CoreError;
use crate::key::DeviceKey;
use crate::listener::Subscription;
use crate::store::StateStore;

/// One device viewed through a typed state projection.
///
/// Holds no state of its own: every [`state`](Self::state) call re-reads
/// the store, so it is always as fresh as the last write.
pub struct DeviceEntity<T> {
    key: DeviceKey,
    name: String,
    store: Arc<StateStore>,
    _view: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> DeviceEntity<T> {
    pub fn new(store: Arc<StateStore>, key: impl Into<DeviceKey>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            store,
            _view: PhantomData,
        }
    }

    pub fn key(&self) -> &DeviceKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the store holds any state for this device.
    pub fn is_available(&self) -> bool {
        self.store.contains(self.key.as_str())
    }

    /// Current state, projected into `T`.
    pub fn state(&self) -> Result<T, CoreError> {
        self.store.view(self.key.as_str())
    }

    /// Run `callback` whenever this device's state is written.
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.store.subscribe(self.key.clone(), callback)
    }
}

impl<T> fmt::Debug for DeviceEntity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceEntity")
            .field("key", &self.key)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::model::{CoverState, LightState};

    #[test]
    fn state_tracks_latest_write() {
        let store = Arc::new(StateStore::new());
        let light: DeviceEntity<LightState> = DeviceEntity::new(Arc::clone(&store), "l1", "Kitchen");
        assert!(!light.is_available());
        assert!(matches!(light.state(), Err(CoreError::DeviceNotFound { .. })));

        store.set("l1", json!({"isOn": true, "brightness": 128}));
        assert_eq!(light.state().unwrap().brightness, Some(128));

        store.set("l1", json!({"isOn": false}));
        assert!(!light.state().unwrap().is_on);
    }

    #[test]
    fn mismatched_blob_is_a_deserialization_error() {
        let store = Arc::new(StateStore::new());
        store.set("c1", json!({"isOn": true}));
        let cover: DeviceEntity<CoverState> = DeviceEntity::new(Arc::clone(&store), "c1", "Garage");

        let err = cover.state().unwrap_err();
        assert!(matches!(err, CoreError::Deserialization { ref key, .. } if key == "c1"));
    }

    #[test]
    fn on_change_rereads_through_entity() {
        let store = Arc::new(StateStore::new());
        let light = Arc::new(DeviceEntity::<LightState>::new(Arc::clone(&store), "l1", "Porch"));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let (entity, log) = (Arc::clone(&light), Arc::clone(&seen));
        let sub = light.on_change(move || {
            if let Ok(state) = entity.state() {
                log.lock().unwrap().push(state.is_on);
            }
        });

        store.set("l1", json!({"isOn": true}));
        store.set("l1", json!({"isOn": false}));
        sub.cancel();
        store.set("l1", json!({"isOn": true}));

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }
}

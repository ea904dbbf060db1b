// ── Device keys and state blobs ──

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque controller-assigned device identifier.
///
/// Also the key of the entity in `DevicesState` and in push updates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceKey(String);

impl DeviceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for DeviceKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DeviceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeviceKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for DeviceKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Schema-free device state as delivered by the controller.
pub type StateBlob = serde_json::Value;

/// Complete device-key → blob map from a full poll.
pub type Snapshot = HashMap<DeviceKey, StateBlob>;

/// Same shape as [`Snapshot`], carrying only the keys that changed.
pub type PartialUpdate = HashMap<DeviceKey, StateBlob>;

/// Re-key a raw controller map.
pub fn snapshot_from_raw(raw: HashMap<String, StateBlob>) -> Snapshot {
    raw.into_iter().map(|(k, v)| (DeviceKey(k), v)).collect()
}

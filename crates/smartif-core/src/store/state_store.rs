// ── Central device-state store ──
//
// Device-key → latest blob, with synchronous per-key fan-out on write.
// Reads are lock-free `DashMap` lookups. Writes funnel through a single
// re-entrant gate held across the replace AND the fan-out, so the poll
// writer and the push writer never interleave.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::ReentrantMutex;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::error::CoreError;
use crate::key::{DeviceKey, PartialUpdate, Snapshot, StateBlob};
use crate::listener::{ListenerRegistry, Subscription};

pub struct StateStore {
    data: DashMap<DeviceKey, Arc<StateBlob>>,
    listeners: ListenerRegistry,
    write_gate: ReentrantMutex<()>,
    last_poll: watch::Sender<Option<DateTime<Utc>>>,
    last_push: watch::Sender<Option<DateTime<Utc>>>,
}

impl StateStore {
    pub fn new() -> Self {
        let (last_poll, _) = watch::channel(None);
        let (last_push, _) = watch::channel(None);

        Self {
            data: DashMap::new(),
            listeners: ListenerRegistry::new(),
            write_gate: ReentrantMutex::new(()),
            last_poll,
            last_push,
        }
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Bulk-load a full snapshot, replacing the whole map. Keys absent from
    /// `snapshot` are dropped. No listener is notified.
    pub fn initialize(&self, snapshot: Snapshot) {
        let _gate = self.write_gate.lock();
        let count = snapshot.len();
        self.data.clear();
        for (key, blob) in snapshot {
            self.data.insert(key, Arc::new(blob));
        }
        tracing::debug!(devices = count, "store initialized");
    }

    /// Replace the blob for `key`, then run its listeners before returning.
    pub fn set(&self, key: impl Into<DeviceKey>, blob: StateBlob) {
        let _gate = self.write_gate.lock();
        self.replace_and_notify(key.into(), blob);
    }

    /// [`set`](Self::set) every entry of `partial`. Keys not present in
    /// `partial` are untouched.
    pub fn merge_partial(&self, partial: PartialUpdate) {
        if partial.is_empty() {
            return;
        }
        let _gate = self.write_gate.lock();
        tracing::debug!(keys = partial.len(), "merging partial update");
        for (key, blob) in partial {
            self.replace_and_notify(key, blob);
        }
    }

    fn replace_and_notify(&self, key: DeviceKey, blob: StateBlob) {
        // The shard guard is released before fan-out so callbacks can read.
        self.data.insert(key.clone(), Arc::new(blob));
        self.listeners.notify(key.as_str());
    }

    /// Drop all device state. Listeners are left to the caller.
    pub fn clear(&self) {
        let _gate = self.write_gate.lock();
        self.data.clear();
        self.last_poll.send_replace(None);
        self.last_push.send_replace(None);
    }

    pub(crate) fn record_poll(&self) {
        self.last_poll.send_replace(Some(Utc::now()));
    }

    pub(crate) fn record_push(&self) {
        self.last_push.send_replace(Some(Utc::now()));
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Latest blob for `key`, or `None` if the key was never written.
    pub fn get(&self, key: &str) -> Option<Arc<StateBlob>> {
        self.data.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Latest blob for `key`, or `fallback` for an unknown key.
    pub fn get_or(&self, key: &str, fallback: StateBlob) -> Arc<StateBlob> {
        self.get(key).unwrap_or_else(|| Arc::new(fallback))
    }

    /// Deserialize the blob for `key` into a typed view.
    pub fn view<T: DeserializeOwned>(&self, key: &str) -> Result<T, CoreError> {
        let blob = self.get(key).ok_or_else(|| CoreError::DeviceNotFound {
            key: key.to_owned(),
        })?;
        T::deserialize(blob.as_ref()).map_err(|e| CoreError::Deserialization {
            key: key.to_owned(),
            message: e.to_string(),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All known keys, sorted.
    pub fn keys(&self) -> Vec<DeviceKey> {
        let mut keys: Vec<_> = self.data.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Point-in-time copy of every key.
    pub fn snapshot(&self) -> Snapshot {
        self.data
            .iter()
            .map(|e| (e.key().clone(), e.value().as_ref().clone()))
            .collect()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Run `callback` after every write to `key`. The callback carries no
    /// payload; re-read the store from inside it.
    pub fn subscribe<F>(&self, key: impl Into<DeviceKey>, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.subscribe(DeviceKey::into_inner(key.into()), callback)
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_poll(&self) -> Option<DateTime<Utc>> {
        *self.last_poll.borrow()
    }

    pub fn last_push(&self) -> Option<DateTime<Utc>> {
        *self.last_push.borrow()
    }

    /// Watch the time of the latest successful poll.
    pub fn subscribe_last_poll(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_poll.subscribe()
    }

    /// How long ago the last successful poll happened, or `None` if never.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_poll().map(|t| Utc::now() - t)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("devices", &self.data.len())
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn partial(entries: &[(&str, StateBlob)]) -> PartialUpdate {
        entries
            .iter()
            .map(|(k, v)| (DeviceKey::from(*k), v.clone()))
            .collect()
    }

    #[test]
    fn set_then_get_returns_blob() {
        let store = StateStore::new();
        store.set("dev1", json!({"isOn": true}));
        assert_eq!(*store.get("dev1").unwrap(), json!({"isOn": true}));
    }

    #[test]
    fn unknown_key_reads_none_or_fallback() {
        let store = StateStore::new();
        assert!(store.get("ghost").is_none());
        assert_eq!(*store.get_or("ghost", json!({})), json!({}));
    }

    #[test]
    fn merge_partial_leaves_other_keys() {
        let store = StateStore::new();
        store.initialize(partial(&[
            ("dev1", json!({"isOn": true})),
            ("dev2", json!({"isOn": false})),
        ]));

        store.merge_partial(partial(&[("dev1", json!({"isOn": false}))]));

        assert_eq!(*store.get("dev1").unwrap(), json!({"isOn": false}));
        assert_eq!(*store.get("dev2").unwrap(), json!({"isOn": false}));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn initialize_does_not_notify() {
        let store = StateStore::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let _sub = store.subscribe("dev1", move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        store.initialize(partial(&[("dev1", json!({"isOn": true}))]));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        store.set("dev1", json!({"isOn": false}));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn second_initialize_replaces_whole_map() {
        let store = StateStore::new();
        store.initialize(partial(&[("old", json!({"isOn": true}))]));
        store.initialize(partial(&[("new", json!({"isOn": false}))]));

        assert!(store.get("old").is_none());
        assert_eq!(*store.get("new").unwrap(), json!({"isOn": false}));
        assert_eq!(store.keys(), vec![DeviceKey::from("new")]);
    }

    #[test]
    fn callback_reads_new_value_during_fan_out() {
        let store = Arc::new(StateStore::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let reader = Arc::clone(&store);
        let seen_cb = Arc::clone(&seen);
        let _sub = store.subscribe("dev1", move || {
            let blob = reader.get("dev1").unwrap();
            seen_cb.lock().unwrap().push(blob["isOn"].clone());
        });

        store.set("dev1", json!({"isOn": true}));
        store.set("dev1", json!({"isOn": false}));

        assert_eq!(*seen.lock().unwrap(), vec![json!(true), json!(false)]);
    }

    #[test]
    fn callback_may_write_to_another_key() {
        let store = Arc::new(StateStore::new());
        let writer = Arc::clone(&store);
        let _sub = store.subscribe("dev1", move || {
            writer.set("mirror", json!({"copied": true}));
        });

        store.set("dev1", json!({"isOn": true}));
        assert_eq!(*store.get("mirror").unwrap(), json!({"copied": true}));
    }

    #[test]
    fn each_write_notifies_its_key_once() {
        let store = StateStore::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let _sub = store.subscribe("dev1", move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        store.merge_partial(partial(&[
            ("dev1", json!({"isOn": true})),
            ("dev2", json!({"isOn": true})),
            ("dev3", json!({"isOn": true})),
        ]));
        store.set("dev2", json!({"isOn": false}));

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn view_projects_blob() {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Light {
            is_on: bool,
        }

        let store = StateStore::new();
        store.set("dev1", json!({"isOn": true, "brightness": 80}));
        store.set("dev2", json!({"state": "armed_home"}));

        assert!(store.view::<Light>("dev1").unwrap().is_on);
        assert!(matches!(
            store.view::<Light>("dev2"),
            Err(CoreError::Deserialization { .. })
        ));
        assert!(matches!(
            store.view::<Light>("ghost"),
            Err(CoreError::DeviceNotFound { .. })
        ));
    }

    #[test]
    fn keys_and_snapshot() {
        let store = StateStore::new();
        store.set("b", json!(2));
        store.set("a", json!(1));

        assert_eq!(store.keys(), vec![DeviceKey::from("a"), DeviceKey::from("b")]);
        let snap = store.snapshot();
        assert_eq!(snap.get("a"), Some(&json!(1)));
        assert!(store.contains("b"));
    }

    #[test]
    fn clear_resets_data_and_timestamps() {
        let store = StateStore::new();
        store.set("dev1", json!({}));
        store.record_poll();
        assert!(store.data_age().is_some());

        store.clear();
        assert!(store.is_empty());
        assert!(store.last_poll().is_none());
    }

    #[test]
    fn concurrent_writers_keep_one_blob_per_key() {
        let store = Arc::new(StateStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for n in 0..100 {
                        store.set("dev1", json!({"writer": i, "n": n}));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("dev1").unwrap()["n"], json!(99));
    }
}

// ── Push → store bridge ──
//
// Forwards out-of-band partial updates into the store through the same
// write entry point the poller uses, and fans out named controller events.
// No buffering, no validation: fragments are merged as delivered.

use std::pin::pin;
use std::sync::Arc;

use futures_core::Stream;
use smartif_api::push::{PushFrame, PushHandle};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::key::{PartialUpdate, snapshot_from_raw};
use crate::listener::ListenerRegistry;
use crate::store::StateStore;

/// One message from the push channel.
#[derive(Debug, Clone, PartialEq)]
pub enum PushMessage {
    /// Partial state update for a subset of devices.
    State(PartialUpdate),
    /// Named controller event, e.g. `VideoDoorCall`.
    Event(String),
}

impl From<PushFrame> for PushMessage {
    fn from(frame: PushFrame) -> Self {
        match frame {
            PushFrame::State(raw) => Self::State(snapshot_from_raw(raw)),
            PushFrame::Event(name) => Self::Event(name),
        }
    }
}

/// Adapt a running push reader into a [`PushMessage`] stream.
///
/// A consumer that falls behind skips the missed frames; the next poll
/// brings the store back in line.
pub fn push_messages(handle: &PushHandle) -> impl Stream<Item = PushMessage> + Send + use<> {
    BroadcastStream::new(handle.subscribe()).filter_map(|item| match item {
        Ok(frame) => Some(PushMessage::from(Arc::unwrap_or_clone(frame))),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            warn!(skipped, "push consumer lagged, frames dropped");
            None
        }
    })
}

/// Writes push-channel deliveries into a [`StateStore`].
#[derive(Debug, Clone)]
pub struct EventBridge {
    store: Arc<StateStore>,
    events: ListenerRegistry,
}

impl EventBridge {
    /// `events` receives named controller events; device state goes to
    /// `store`.
    pub fn new(store: Arc<StateStore>, events: ListenerRegistry) -> Self {
        Self { store, events }
    }

    /// Merge a partial update. Every touched key notifies its listeners
    /// before this returns.
    pub fn ingest(&self, partial: PartialUpdate) {
        debug!(keys = partial.len(), "push update");
        self.store.merge_partial(partial);
        self.store.record_push();
    }

    /// Fan out a named controller event.
    pub fn ingest_event(&self, name: &str) {
        debug!(event = name, "push event");
        self.store.record_push();
        self.events.notify(name);
    }

    pub fn dispatch(&self, message: PushMessage) {
        match message {
            PushMessage::State(partial) => self.ingest(partial),
            PushMessage::Event(name) => self.ingest_event(&name),
        }
    }

    /// Drain `stream` in delivery order until it ends or `cancel` fires.
    pub async fn run<S>(&self, stream: S, cancel: CancellationToken)
    where
        S: Stream<Item = PushMessage>,
    {
        let mut stream = pin!(stream);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                message = stream.next() => {
                    let Some(message) = message else {
                        debug!("push stream ended");
                        break;
                    };
                    self.dispatch(message);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::UnboundedReceiverStream;

    use super::*;
    use crate::test_support::snapshot;

    fn bridge() -> (EventBridge, Arc<StateStore>, ListenerRegistry) {
        let store = Arc::new(StateStore::new());
        let events = ListenerRegistry::new();
        (EventBridge::new(Arc::clone(&store), events.clone()), store, events)
    }

    #[test]
    fn ingest_merges_and_notifies() {
        let (bridge, store, _) = bridge();
        store.initialize(snapshot(&[("dev1", json!({"isOn": true}))]));
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let _sub = store.subscribe("dev1", move || {
            h.fetch_add(1, Ordering::SeqCst);
        });

        bridge.ingest(snapshot(&[("dev1", json!({"isOn": false}))]));

        assert_eq!(*store.get("dev1").unwrap(), json!({"isOn": false}));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(store.last_push().is_some());
    }

    #[test]
    fn push_accepts_keys_not_seen_by_polling() {
        let (bridge, store, _) = bridge();
        bridge.ingest(snapshot(&[("siren-9", json!({"isOn": true}))]));
        assert!(store.contains("siren-9"));
    }

    #[test]
    fn named_event_reaches_event_listeners_only() {
        let (bridge, store, events) = bridge();
        let rings = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&rings);
        let _sub = events.subscribe("VideoDoorCall", move || {
            r.fetch_add(1, Ordering::SeqCst);
        });

        bridge.dispatch(PushMessage::Event("VideoDoorCall".into()));
        bridge.dispatch(PushMessage::Event("SomethingElse".into()));

        assert_eq!(rings.load(Ordering::SeqCst), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn frame_conversion() {
        let mut raw = HashMap::new();
        raw.insert("dev1".to_owned(), json!({"isOn": true}));
        let PushMessage::State(partial) = PushMessage::from(PushFrame::State(raw)) else {
            panic!("expected state");
        };
        assert_eq!(partial.get("dev1"), Some(&json!({"isOn": true})));
    }

    #[tokio::test]
    async fn run_applies_messages_in_order_until_stream_ends() {
        let (bridge, store, _) = bridge();
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(PushMessage::State(snapshot(&[("dev1", json!({"n": 1}))])))
            .unwrap();
        tx.send(PushMessage::State(snapshot(&[("dev1", json!({"n": 2}))])))
            .unwrap();
        drop(tx);

        bridge
            .run(UnboundedReceiverStream::new(rx), CancellationToken::new())
            .await;

        assert_eq!(*store.get("dev1").unwrap(), json!({"n": 2}));
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let (bridge, _, _) = bridge();
        let (_tx, rx) = mpsc::unbounded_channel::<PushMessage>();
        let cancel = CancellationToken::new();
        cancel.cancel();

        bridge.run(UnboundedReceiverStream::new(rx), cancel).await;
    }
}

//! Push channel with auto-reconnect.
//!
//! Connects to a SmartIf push endpoint over WebSocket and streams decoded
//! frames through a [`tokio::sync::broadcast`] channel, reconnecting with
//! a doubling delay whenever the connection drops.
//!
//! Every text frame is a JSON object. A frame of the form
//! `{"event": "VideoDoorCall"}` announces a named controller event; any
//! other object is a partial state update mapping device-keys to state
//! fragments.
//!
//! # Example
//!
//! ```rust,ignore
//! use smartif_api::push::{PushHandle, ReconnectConfig};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let cancel = CancellationToken::new();
//! let url = Url::parse("ws://192.168.1.20:42443/Events")?;
//!
//! let handle = PushHandle::spawn(url, ReconnectConfig::default(), cancel.clone());
//! let mut rx = handle.subscribe();
//!
//! while let Ok(frame) = rx.recv().await {
//!     println!("{frame:?}");
//! }
//!
//! handle.shutdown();
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;

// ── Broadcast channel capacity ───────────────────────────────────────

const FRAME_CHANNEL_CAPACITY: usize = 1024;

// ── PushFrame ────────────────────────────────────────────────────────

/// A decoded frame from the push channel.
#[derive(Debug, Clone, PartialEq)]
pub enum PushFrame {
    /// Partial state update: device-key → state fragment.
    State(HashMap<String, serde_json::Value>),
    /// Named controller event (e.g. a doorbell press).
    Event(String),
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── PushHandle ───────────────────────────────────────────────────────

/// Handle to a running push reader.
///
/// Call [`shutdown`](Self::shutdown) (or cancel the token passed to
/// [`spawn`](Self::spawn)) to tear down the background task, then
/// [`into_task`](Self::into_task) to wait for it.
pub struct PushHandle {
    frame_rx: broadcast::Receiver<Arc<PushFrame>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PushHandle {
    /// Spawn the reconnection loop and return immediately.
    ///
    /// The first connection attempt happens asynchronously -- subscribe
    /// to start consuming frames.
    pub fn spawn(url: Url, reconnect: ReconnectConfig, cancel: CancellationToken) -> Self {
        let (frame_tx, frame_rx) = broadcast::channel(FRAME_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            push_loop(url, frame_tx, reconnect, task_cancel).await;
        });

        Self {
            frame_rx,
            cancel,
            task,
        }
    }

    /// Get a new receiver for the frame stream.
    ///
    /// If a consumer falls behind, it receives
    /// [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PushFrame>> {
        self.frame_rx.resubscribe()
    }

    /// Signal the background task to shut down gracefully.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// The reader task. Dropping the handle only detaches it; existing
    /// receivers keep working until the task ends.
    pub fn into_task(self) -> JoinHandle<()> {
        self.task
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// How a single connection ended without an error.
#[derive(Debug, PartialEq, Eq)]
enum Ended {
    Cancelled,
    Closed,
}

async fn push_loop(
    url: Url,
    frame_tx: broadcast::Sender<Arc<PushFrame>>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut backoff = Backoff::new(&reconnect);

    loop {
        match read_connection(&url, &frame_tx, &cancel).await {
            Ok(Ended::Cancelled) => break,
            Ok(Ended::Closed) => {
                tracing::info!("push channel closed by controller, reconnecting");
                backoff.reset();
                continue;
            }
            Err(e) => tracing::warn!(error = %e, failures = backoff.failures(), "push channel error"),
        }

        let Some(delay) = backoff.next_delay() else {
            tracing::error!(
                max_retries = ?reconnect.max_retries,
                "push reconnection limit reached, giving up"
            );
            break;
        };
        tracing::debug!(?delay, "waiting before push reconnect");

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }
    }

    tracing::debug!("push loop exiting");
}

/// Read one connection until it closes, fails, or `cancel` fires.
async fn read_connection(
    url: &Url,
    frame_tx: &broadcast::Sender<Arc<PushFrame>>,
    cancel: &CancellationToken,
) -> Result<Ended, Error> {
    tracing::info!(url = %url, "connecting to push channel");
    let connect = tokio_tungstenite::connect_async(url.as_str());
    let (mut ws, _response) = tokio::select! {
        biased;
        () = cancel.cancelled() => return Ok(Ended::Cancelled),
        result = connect => result.map_err(|e| Error::WebSocketConnect(e.to_string()))?,
    };
    tracing::info!("push channel connected");

    loop {
        let message = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(Ended::Cancelled),
            message = ws.next() => message,
        };

        match message {
            None => return Ok(Ended::Closed),
            Some(Err(e)) => return Err(Error::WebSocketConnect(e.to_string())),
            Some(Ok(tungstenite::Message::Text(text))) => parse_and_broadcast(&text, frame_tx),
            Some(Ok(tungstenite::Message::Close(Some(close))))
                if close.code != CloseCode::Normal =>
            {
                return Err(Error::WebSocketClosed {
                    code: close.code.into(),
                    reason: close.reason.as_str().to_owned(),
                });
            }
            Some(Ok(tungstenite::Message::Close(_))) => return Ok(Ended::Closed),
            // Pings are answered inside tungstenite; binary frames carry nothing for us.
            Some(Ok(_)) => {}
        }
    }
}

// ── Frame parsing ────────────────────────────────────────────────────

/// Decode a text frame. Returns `None` for anything that is not a JSON object.
pub fn parse_frame(text: &str) -> Option<PushFrame> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "failed to parse push frame");
            return None;
        }
    };

    let serde_json::Value::Object(map) = value else {
        tracing::debug!("push frame is not a JSON object, skipping");
        return None;
    };

    if map.len() == 1 {
        if let Some(serde_json::Value::String(name)) = map.get("event") {
            return Some(PushFrame::Event(name.clone()));
        }
    }

    Some(PushFrame::State(map.into_iter().collect()))
}

fn parse_and_broadcast(text: &str, frame_tx: &broadcast::Sender<Arc<PushFrame>>) {
    if let Some(frame) = parse_frame(text) {
        // No active subscribers right now is not an error.
        let _ = frame_tx.send(Arc::new(frame));
    }
}

// ── Backoff ──────────────────────────────────────────────────────────

/// Doubling reconnect delay, capped at `max_delay`, bounded by `max_retries`.
struct Backoff<'a> {
    config: &'a ReconnectConfig,
    failures: u32,
}

impl<'a> Backoff<'a> {
    fn new(config: &'a ReconnectConfig) -> Self {
        Self {
            config,
            failures: 0,
        }
    }

    fn failures(&self) -> u32 {
        self.failures
    }

    fn reset(&mut self) {
        self.failures = 0;
    }

    /// Delay before the next attempt, or `None` once the retry budget is spent.
    fn next_delay(&mut self) -> Option<Duration> {
        if self
            .config
            .max_retries
            .is_some_and(|max| self.failures >= max)
        {
            return None;
        }
        let factor = 1_u32.checked_shl(self.failures.min(16)).unwrap_or(u32::MAX);
        self.failures += 1;
        Some(
            self.config
                .initial_delay
                .saturating_mul(factor)
                .min(self.config.max_delay),
        )
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_reconnect_config() {
        let config = ReconnectConfig::default();
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert!(config.max_retries.is_none());
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_retries: None,
        };
        let mut backoff = Backoff::new(&config);
        let delays: Vec<u64> = (0..6)
            .map(|_| backoff.next_delay().unwrap().as_secs())
            .collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 10, 10]);

        backoff.reset();
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn backoff_respects_retry_budget() {
        let config = ReconnectConfig {
            max_retries: Some(2),
            ..ReconnectConfig::default()
        };
        let mut backoff = Backoff::new(&config);
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert_eq!(backoff.next_delay(), None);
        assert_eq!(backoff.failures(), 2);
    }

    #[test]
    fn parses_state_frame() {
        let frame = parse_frame(r#"{"dev1": {"isOn": false}, "dev2": {"state": "armed_home"}}"#)
            .unwrap();
        let PushFrame::State(map) = frame else {
            panic!("expected a state frame");
        };
        assert_eq!(map.len(), 2);
        assert_eq!(map["dev1"], serde_json::json!({"isOn": false}));
    }

    #[test]
    fn parses_named_event() {
        let frame = parse_frame(r#"{"event": "VideoDoorCall"}"#).unwrap();
        assert_eq!(frame, PushFrame::Event("VideoDoorCall".into()));
    }

    #[test]
    fn event_key_next_to_devices_is_state() {
        // A device literally keyed "event" alongside others is still state.
        let frame = parse_frame(r#"{"event": {"isOn": true}, "dev1": {"isOn": true}}"#).unwrap();
        assert!(matches!(frame, PushFrame::State(_)));
    }

    #[test]
    fn rejects_non_objects() {
        assert!(parse_frame("not json at all").is_none());
        assert!(parse_frame("[1, 2, 3]").is_none());
    }

    #[test]
    fn parse_and_broadcast_delivers_to_subscribers() {
        let (tx, mut rx) = broadcast::channel(16);
        parse_and_broadcast(r#"{"dev1": {"isOn": true}}"#, &tx);
        let frame = rx.try_recv().unwrap();
        assert!(matches!(*frame, PushFrame::State(_)));
    }

    #[test]
    fn parse_and_broadcast_skips_malformed() {
        let (tx, mut rx) = broadcast::channel::<Arc<PushFrame>>(16);
        parse_and_broadcast("{", &tx);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn reader_task_ends_after_shutdown() {
        // Nothing listens on port 1, so the reader sits in backoff.
        let url = Url::parse("ws://127.0.0.1:1/").unwrap();
        let handle = PushHandle::spawn(url, ReconnectConfig::default(), CancellationToken::new());

        handle.shutdown();
        let joined = tokio::time::timeout(Duration::from_secs(5), handle.into_task()).await;

        assert!(joined.unwrap().is_ok());
    }
}

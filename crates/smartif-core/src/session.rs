// ── Session ──
//
// Owns one controller connection: the store, both listener registries, the
// poll coordinator and the background tasks. Lifetime of all device state
// is tied to `connect()` / `disconnect()`.

use std::sync::Arc;

use futures_core::Stream;
use parking_lot::Mutex as SyncMutex;
use serde::de::DeserializeOwned;
use smartif_api::push::PushHandle;
use smartif_api::{SmartIfClient, TransportConfig};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bridge::{EventBridge, PushMessage, push_messages};
use crate::client::ControllerClient;
use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::key::{DeviceKey, StateBlob};
use crate::listener::{ListenerRegistry, Subscription};
use crate::model::DeviceEntity;
use crate::poll::{PollCoordinator, PollSettings, PollState};
use crate::store::StateStore;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<SessionInner>`. Call
/// [`connect`](Self::connect) to acquire the initial state and start
/// background polling (plus the push bridge when configured).
pub struct Session<C: ControllerClient = SmartIfClient> {
    inner: Arc<SessionInner<C>>,
}

struct SessionInner<C> {
    config: SessionConfig,
    client: Arc<C>,
    store: Arc<StateStore>,
    events: ListenerRegistry,
    poll: SyncMutex<Option<Arc<PollCoordinator<C>>>>,
    cancel: SyncMutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl<C: ControllerClient> Clone for Session<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Session<SmartIfClient> {
    /// Create a session talking HTTP to `config.url`. Does NOT connect.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::with_timeout(config.timeout);
        let client = SmartIfClient::new(config.url.clone(), &transport)?;
        Ok(Self::with_client(config, client))
    }
}

impl<C: ControllerClient> Session<C> {
    /// Create a session over any [`ControllerClient`]. Does NOT connect.
    pub fn with_client(config: SessionConfig, client: C) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                config,
                client: Arc::new(client),
                store: Arc::new(StateStore::new()),
                events: ListenerRegistry::new(),
                poll: SyncMutex::new(None),
                cancel: SyncMutex::new(CancellationToken::new()),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &Arc<C> {
        &self.inner.client
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Acquire the initial device state, then spawn the poll task and,
    /// when a push URL is configured, the push bridge.
    ///
    /// If first light exhausts its retries the error is returned, no task
    /// is started, and the store stays empty. A [`disconnect`](Self::disconnect)
    /// issued meanwhile aborts first light with [`CoreError::SessionClosed`].
    /// Calling `connect` on a connected session is a no-op.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let config = &self.inner.config;
        config.validate()?;

        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            debug!("session already connected");
            return Ok(());
        }

        // Installed before first light so disconnect can interrupt it.
        let cancel = CancellationToken::new();
        *self.inner.cancel.lock() = cancel.clone();

        let poll = Arc::new(PollCoordinator::new(
            Arc::clone(&self.inner.client),
            Arc::clone(&self.inner.store),
            PollSettings::from(config),
        ));
        *self.inner.poll.lock() = Some(Arc::clone(&poll));

        info!(url = %config.url, "acquiring initial device state");
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                *self.inner.poll.lock() = None;
                self.inner.store.clear();
                info!("connect abandoned by disconnect");
                return Err(CoreError::SessionClosed);
            }
            result = poll.acquire_initial() => result?,
        }

        {
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move { poll.run(cancel).await }));
        }

        if let Some(ref url) = config.push_url {
            let push =
                PushHandle::spawn(url.clone(), config.push_reconnect.clone(), cancel.child_token());
            let stream = push_messages(&push);
            let bridge = self.bridge();
            handles.push(tokio::spawn(async move { bridge.run(stream, cancel).await }));
            handles.push(push.into_task());
            info!(url = %url, "push bridge started");
        }

        info!(devices = self.inner.store.len(), "session connected");
        Ok(())
    }

    /// Feed an external push stream into the store for the rest of this
    /// connection.
    pub async fn attach_push<S>(&self, stream: S) -> Result<(), CoreError>
    where
        S: Stream<Item = PushMessage> + Send + 'static,
    {
        let mut handles = self.inner.task_handles.lock().await;
        if handles.is_empty() {
            return Err(CoreError::SessionClosed);
        }
        let cancel = self.inner.cancel.lock().clone();
        let bridge = self.bridge();
        handles.push(tokio::spawn(async move { bridge.run(stream, cancel).await }));
        Ok(())
    }

    /// Stop background tasks, wait for them, and drop all device state and
    /// registrations.
    pub async fn disconnect(&self) {
        // First cancel interrupts a connect that holds the handle lock.
        self.inner.cancel.lock().cancel();

        let mut handles = self.inner.task_handles.lock().await;
        // A connect that finished in between installed a fresh token.
        self.inner.cancel.lock().cancel();
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "background task ended abnormally");
            }
        }

        self.inner.store.clear();
        self.inner.store.listeners().clear();
        self.inner.events.clear();
        *self.inner.poll.lock() = None;
        debug!("session disconnected");
    }

    // ── State observation ────────────────────────────────────────────

    /// Poller lifecycle, or `None` before the first `connect`.
    pub fn poll_state(&self) -> Option<PollState> {
        self.poller().map(|p| p.current_state())
    }

    pub fn is_connected(&self) -> bool {
        self.poll_state() == Some(PollState::Steady)
    }

    pub fn get(&self, key: &str) -> Option<Arc<StateBlob>> {
        self.inner.store.get(key)
    }

    /// Run `callback` after every write to `key`.
    pub fn subscribe<F>(&self, key: impl Into<DeviceKey>, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.store.subscribe(key, callback)
    }

    /// Run `callback` whenever the controller announces event `name`.
    pub fn on_event<F>(&self, name: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.events.subscribe(name, callback)
    }

    /// Typed handle to one device.
    pub fn entity<T: DeserializeOwned>(
        &self,
        key: impl Into<DeviceKey>,
        name: impl Into<String>,
    ) -> DeviceEntity<T> {
        DeviceEntity::new(Arc::clone(&self.inner.store), key, name)
    }

    /// A bridge writing into this session's store and event registry.
    pub fn bridge(&self) -> EventBridge {
        EventBridge::new(Arc::clone(&self.inner.store), self.inner.events.clone())
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Run one poll immediately, outside the regular schedule.
    pub async fn refresh_now(&self) -> Result<(), CoreError> {
        let poll = self.poller().ok_or(CoreError::SessionClosed)?;
        poll.refresh_now().await
    }

    /// Perform a device action, then refresh so the result shows up
    /// without waiting for the next tick. A failed refresh is only logged.
    pub async fn perform_action(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<(), CoreError> {
        self.inner.client.perform_action(path, params).await?;

        if let Some(poll) = self.poller() {
            if let Err(e) = poll.refresh_now().await {
                warn!(error = %e, path, "refresh after action failed");
            }
        }
        Ok(())
    }

    fn poller(&self) -> Option<Arc<PollCoordinator<C>>> {
        self.inner.poll.lock().clone()
    }
}

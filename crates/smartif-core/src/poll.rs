// ── Poll coordinator ──
//
// First light: bounded fixed-interval retries until a snapshot seeds the
// store. Steady: one full snapshot per period, merged without eviction.
// A failed steady poll is logged and the next tick proceeds normally.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::client::ControllerClient;
use crate::config::{DEFAULT_INITIAL_RETRIES, DEFAULT_POLL_INTERVAL, SessionConfig};
use crate::error::CoreError;
use crate::key::Snapshot;
use crate::store::StateStore;

/// Poller lifecycle, observable through [`PollCoordinator::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// First light in progress. `attempt` is 1-based; 0 means not started.
    AcquiringInitial { attempt: u32 },
    /// Store seeded; periodic polling.
    Steady,
    /// First light exhausted its retries. Terminal.
    Failed,
}

/// Timing knobs for [`PollCoordinator`].
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub poll_interval: Duration,
    pub initial_retries: u32,
    pub retry_interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            initial_retries: DEFAULT_INITIAL_RETRIES,
            retry_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl From<&SessionConfig> for PollSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            initial_retries: config.initial_retries,
            retry_interval: config.retry_interval,
        }
    }
}

/// Drives the full-state channel into a [`StateStore`].
pub struct PollCoordinator<C> {
    client: Arc<C>,
    store: Arc<StateStore>,
    settings: PollSettings,
    state: watch::Sender<PollState>,
    attempts: AtomicU32,
}

impl<C: ControllerClient> PollCoordinator<C> {
    pub fn new(client: Arc<C>, store: Arc<StateStore>, settings: PollSettings) -> Self {
        let (state, _) = watch::channel(PollState::AcquiringInitial { attempt: 0 });
        Self {
            client,
            store,
            settings,
            state,
            attempts: AtomicU32::new(0),
        }
    }

    /// Current lifecycle state.
    pub fn current_state(&self) -> PollState {
        *self.state.borrow()
    }

    /// Subscribe to lifecycle changes.
    pub fn state(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    /// Total snapshot fetches issued, first light included.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }

    // ── First light ──────────────────────────────────────────────────

    /// Fetch until a snapshot seeds the store, sleeping `retry_interval`
    /// between failures, for at most `initial_retries` attempts.
    ///
    /// On exhaustion the state becomes [`PollState::Failed`] and the last
    /// fetch error is returned inside
    /// [`CoreError::InitialAcquisitionFailed`].
    pub async fn acquire_initial(&self) -> Result<(), CoreError> {
        let max_attempts = self.settings.initial_retries.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.state
                .send_replace(PollState::AcquiringInitial { attempt });

            match self.fetch().await {
                Ok(snapshot) => {
                    self.store.initialize(snapshot);
                    self.store.record_poll();
                    self.state.send_replace(PollState::Steady);
                    info!(attempt, devices = self.store.len(), "initial device state acquired");
                    return Ok(());
                }
                Err(e) if attempt >= max_attempts => {
                    error!(attempts = attempt, error = %e, "could not acquire initial device state");
                    self.state.send_replace(PollState::Failed);
                    return Err(CoreError::InitialAcquisitionFailed {
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts,
                        error = %e,
                        "initial device state fetch failed, retrying"
                    );
                    tokio::time::sleep(self.settings.retry_interval).await;
                }
            }
        }
    }

    // ── Steady state ─────────────────────────────────────────────────

    /// One steady poll: fetch and merge. Keys missing from the snapshot
    /// keep their last value.
    pub async fn refresh_now(&self) -> Result<(), CoreError> {
        let snapshot = self.fetch().await?;
        let devices = snapshot.len();
        self.store.merge_partial(snapshot);
        self.store.record_poll();
        debug!(devices, "poll merged");
        Ok(())
    }

    /// Poll every `poll_interval` until cancelled. The first poll happens
    /// one period after the call.
    pub async fn run(&self, cancel: CancellationToken) {
        // interval() panics on a zero period.
        let period = self.settings.poll_interval.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await; // consume the immediate first tick

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if let Err(e) = self.refresh_now().await {
                        warn!(error = %e, "periodic poll failed");
                    }
                }
            }
        }

        debug!("poll loop exiting");
    }

    async fn fetch(&self) -> Result<Snapshot, CoreError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        self.client.fetch_snapshot().await
    }
}

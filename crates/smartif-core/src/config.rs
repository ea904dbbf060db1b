// ── Runtime session configuration ──
//
// Describes *how* to talk to one SmartIf controller. Never touches disk:
// the CLI (via smartif-config) builds a `SessionConfig` and hands it in.

use std::time::Duration;

use smartif_api::push::ReconnectConfig;
use url::Url;

use crate::error::CoreError;

/// Full-state poll period and first-light retry interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// First-light attempts before the session gives up.
pub const DEFAULT_INITIAL_RETRIES: u32 = 10;

/// Configuration for one controller session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Controller base URL (e.g. `http://192.168.1.20:42443/`).
    pub url: Url,
    /// Per-request timeout enforced by the HTTP client.
    pub timeout: Duration,
    /// Steady-state full poll period.
    pub poll_interval: Duration,
    /// Bound on first-light fetch attempts.
    pub initial_retries: u32,
    /// Sleep between failed first-light attempts.
    pub retry_interval: Duration,
    /// Push channel endpoint. `None` runs on polling alone.
    pub push_url: Option<Url>,
    pub push_reconnect: ReconnectConfig,
}

impl SessionConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: smartif_api::DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            initial_retries: DEFAULT_INITIAL_RETRIES,
            retry_interval: DEFAULT_POLL_INTERVAL,
            push_url: None,
            push_reconnect: ReconnectConfig::default(),
        }
    }

    pub fn with_push_url(mut self, url: Url) -> Self {
        self.push_url = Some(url);
        self
    }

    /// Reject settings the poller cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.initial_retries == 0 {
            return Err(CoreError::Config {
                message: "initial_retries must be at least 1".into(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(CoreError::Config {
                message: "poll_interval must be greater than zero".into(),
            });
        }
        if self.timeout.is_zero() {
            return Err(CoreError::Config {
                message: "timeout must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

// ── Core error types ──
//
// User-facing errors from smartif-core. Consumers never see reqwest or
// tungstenite errors directly: the `From<smartif_api::Error>` impl folds
// transport failures into connection-kind variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to SmartIf at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Timeout occurred while connecting to SmartIf (after {timeout_secs}s)")]
    Timeout { timeout_secs: u64 },

    /// First-light retries were exhausted. Fatal for the session.
    #[error("Could not acquire initial device state after {attempts} attempts")]
    InitialAcquisitionFailed {
        attempts: u32,
        #[source]
        source: Box<CoreError>,
    },

    #[error("Session is not connected")]
    SessionClosed,

    // ── Data errors ──────────────────────────────────────────────────
    /// A blob did not match the typed view requested for it.
    #[error("State of {key} does not match the expected shape: {message}")]
    Deserialization { key: String, message: String },

    #[error("Device not found: {key}")]
    DeviceNotFound { key: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// `true` for failures of the controller link (what the poller retries on).
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::SessionClosed
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<smartif_api::Error> for CoreError {
    fn from(err: smartif_api::Error) -> Self {
        match err {
            // Timeouts were already classified with their real duration.
            smartif_api::Error::Transport(e) => CoreError::ConnectionFailed {
                url: e
                    .url()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "<unknown>".into()),
                reason: e.to_string(),
            },
            smartif_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            smartif_api::Error::Status { status, path } => CoreError::ConnectionFailed {
                url: path,
                reason: format!("HTTP {status}"),
            },
            smartif_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            smartif_api::Error::InvalidBaseUrl(url) => CoreError::Config {
                message: format!("URL cannot be used as a controller base: {url}"),
            },
            // A garbled body is still a failed exchange with the controller.
            smartif_api::Error::Deserialization { message, body: _ } => {
                CoreError::ConnectionFailed {
                    url: String::new(),
                    reason: format!("Unexpected response: {message}"),
                }
            }
            smartif_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("Push channel connection failed: {reason}"),
            },
            smartif_api::Error::WebSocketClosed { code, reason } => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("Push channel closed (code {code}): {reason}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_timeout_maps_to_timeout() {
        let err: CoreError = smartif_api::Error::Timeout { timeout_secs: 8 }.into();
        assert!(matches!(err, CoreError::Timeout { timeout_secs: 8 }));
        assert!(err.is_connection_error());
    }

    #[test]
    fn api_status_is_a_connection_error() {
        let err: CoreError = smartif_api::Error::Status {
            status: 502,
            path: "DevicesState".into(),
        }
        .into();
        assert!(err.is_connection_error());
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[test]
    fn deserialization_is_not_a_connection_error() {
        let err = CoreError::Deserialization {
            key: "dev1".into(),
            message: "missing field `isOn`".into(),
        };
        assert!(!err.is_connection_error());
    }

    #[test]
    fn exhausted_acquisition_keeps_source() {
        let err = CoreError::InitialAcquisitionFailed {
            attempts: 10,
            source: Box::new(CoreError::Timeout { timeout_secs: 8 }),
        };
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("Timeout occurred while connecting to SmartIf (after 8s)")
        );
    }
}

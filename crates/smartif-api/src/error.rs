use thiserror::Error;

/// Top-level error type for the `smartif-api` crate.
///
/// Covers every failure mode of the controller surfaces: HTTP transport,
/// response decoding, and the push WebSocket. `smartif-core` folds these
/// into its connection-error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("URL cannot be used as a controller base: {0}")]
    InvalidBaseUrl(String),

    /// Request timed out.
    #[error("Timeout occurred while connecting to SmartIf (after {timeout_secs}s)")]
    Timeout { timeout_secs: u64 },

    /// Controller answered with a non-success HTTP status.
    #[error("SmartIf responded with HTTP {status} for {path}")]
    Status { status: u16, path: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Push channel ────────────────────────────────────────────────
    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// WebSocket closed unexpectedly.
    #[error("WebSocket closed (code {code}): {reason}")]
    WebSocketClosed { code: u16, reason: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Timeout { .. } | Self::WebSocketConnect(_) | Self::WebSocketClosed { .. } => {
                true
            }
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the controller reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Status { status: 404, .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_and_server_errors_are_transient() {
        assert!(Error::Timeout { timeout_secs: 8 }.is_transient());
        assert!(
            Error::Status {
                status: 503,
                path: "DevicesState".into()
            }
            .is_transient()
        );
        assert!(
            !Error::Status {
                status: 400,
                path: "DevicesState".into()
            }
            .is_transient()
        );
    }

    #[test]
    fn deserialization_is_not_transient() {
        let err = Error::Deserialization {
            message: "expected object".into(),
            body: "[]".into(),
        };
        assert!(!err.is_transient());
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_status() {
        let err = Error::Status {
            status: 404,
            path: "Lights".into(),
        };
        assert!(err.is_not_found());
    }
}

//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use smartif_config::ConfigError;
use smartif_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(smartif::connection_failed),
        help(
            "Check that the controller is running and reachable.\n\
             URL: {url}\n\
             Try: smartif --host <HOST> state"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("No device state after {attempts} attempt(s)")]
    #[diagnostic(
        code(smartif::initial_state),
        help(
            "The controller did not answer DevicesState.\n\
             Raise initial_retries in your profile or check the controller logs."
        )
    )]
    InitialState {
        attempts: u32,
        #[source]
        source: Box<CoreError>,
    },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(smartif::not_found),
        help("Run: smartif {list_command} to see what the controller knows about")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Unexpected state for {key}: {message}")]
    #[diagnostic(code(smartif::state_shape))]
    UnexpectedState { key: String, message: String },

    #[error("Controller error: {message}")]
    #[diagnostic(code(smartif::api_error))]
    Api { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(smartif::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(smartif::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: smartif config init --controller-host <HOST>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(smartif::no_config),
        help(
            "Create a profile with: smartif config init --controller-host <HOST>\n\
             Or pass --host / set SMARTIF_HOST.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(smartif::config))]
    Config(ConfigError),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(smartif::timeout),
        help("Increase timeout with --timeout or check controller responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON encoding failed: {0}")]
    #[diagnostic(code(smartif::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML encoding failed: {0}")]
    #[diagnostic(code(smartif::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML encoding failed: {0}")]
    #[diagnostic(code(smartif::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::InitialState { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::InitialAcquisitionFailed { attempts, source } => {
                CliError::InitialState { attempts, source }
            }

            CoreError::SessionClosed => CliError::ConnectionFailed {
                url: "(disconnected)".into(),
                source: "Session is not connected".into(),
            },

            CoreError::Deserialization { key, message } => {
                CliError::UnexpectedState { key, message }
            }

            CoreError::DeviceNotFound { key } => CliError::NotFound {
                resource_type: "device".into(),
                identifier: key,
                list_command: "state".into(),
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Api { message },
        }
    }
}

impl From<smartif_api::Error> for CliError {
    fn from(err: smartif_api::Error) -> Self {
        match err {
            smartif_api::Error::Status { status: 404, path } => CliError::NotFound {
                resource_type: "entity".into(),
                identifier: path,
                list_command: "devices <KIND>".into(),
            },
            other => CoreError::from(other).into(),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}

//! Shared configuration for SmartIf tools.
//!
//! TOML profiles layered with `SMARTIF_*` environment overrides, and
//! translation to `smartif_core::SessionConfig`. The CLI adds flag-aware
//! wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use smartif_core::SessionConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("no profile selected and no default_profile configured")]
    NoProfile,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Resolve `name` (or the default profile) to its entry.
    pub fn profile<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .ok_or(ConfigError::NoProfile)?;
        self.profiles
            .get(name)
            .map(|p| (name, p))
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Full-state poll period in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// First-light attempts before giving up.
    #[serde(default = "default_initial_retries")]
    pub initial_retries: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
            initial_retries: default_initial_retries(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    smartif_api::DEFAULT_TIMEOUT.as_secs()
}
fn default_poll_interval() -> u64 {
    smartif_core::config::DEFAULT_POLL_INTERVAL.as_secs()
}
fn default_initial_retries() -> u32 {
    smartif_core::config::DEFAULT_INITIAL_RETRIES
}

/// A named controller profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Controller host name or IP address.
    pub host: String,

    /// Controller port (default 42443).
    pub port: Option<u16>,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,

    /// Override poll period (seconds).
    pub poll_interval: Option<u64>,

    /// Override first-light attempt bound.
    pub initial_retries: Option<u32>,

    /// Sleep between first-light attempts (seconds). Defaults to the poll period.
    pub retry_interval: Option<u64>,

    /// Push channel WebSocket URL (e.g. "ws://192.168.1.20:42443/Events").
    pub push_url: Option<String>,
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Build a `SessionConfig` from this profile, falling back to `defaults`.
    pub fn to_session_config(&self, defaults: &Defaults) -> Result<SessionConfig, ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "host".into(),
                reason: "must not be empty".into(),
            });
        }

        let url = smartif_api::base_url_for(&self.host, self.port.unwrap_or(smartif_api::DEFAULT_PORT))
            .map_err(|e| ConfigError::Validation {
                field: "host".into(),
                reason: e.to_string(),
            })?;

        let mut config = SessionConfig::new(url);
        config.timeout = Duration::from_secs(self.timeout.unwrap_or(defaults.timeout));
        config.poll_interval =
            Duration::from_secs(self.poll_interval.unwrap_or(defaults.poll_interval));
        config.initial_retries = self.initial_retries.unwrap_or(defaults.initial_retries);
        config.retry_interval = self
            .retry_interval
            .map_or(config.poll_interval, Duration::from_secs);
        config.push_url = self.push_url.as_deref().map(parse_push_url).transpose()?;

        config.validate().map_err(|e| ConfigError::Validation {
            field: "profile".into(),
            reason: e.to_string(),
        })?;

        Ok(config)
    }
}

/// Parse and check a push channel URL (`ws://` or `wss://`).
pub fn parse_push_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Validation {
        field: "push_url".into(),
        reason: format!("{raw}: {e}"),
    })?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(ConfigError::Validation {
            field: "push_url".into(),
            reason: format!("expected a ws:// or wss:// URL, got '{other}://'"),
        }),
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "smartif", "smartif").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("smartif");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file is fine), then `SMARTIF_*` env vars.
///
/// Nested keys use a double underscore:
/// `SMARTIF_PROFILES__HOME__HOST=10.0.0.5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SMARTIF_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

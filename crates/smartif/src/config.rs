//! Flag-aware wrappers over `smartif-config`.
//!
//! Resolves the active profile, applies `--host`/`--port`/`--timeout`
//! overrides, and produces the `SessionConfig` every command runs with.

use smartif_config::{Config, Profile};
use smartif_core::SessionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Name of the profile selected by `--profile` or the config default.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> Option<String> {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
}

/// Build a `SessionConfig` from the config file, profile, and CLI overrides.
pub fn build_session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = smartif_config::load_config_or_default();
    resolve(global, &cfg)
}

pub(crate) fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<SessionConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    // A named profile, with flags layered on top
    if let Some(profile) = profile_name.as_deref().and_then(|n| cfg.profiles.get(n)) {
        let profile = apply_overrides(profile.clone(), global);
        return Ok(profile.to_session_config(&cfg.defaults)?);
    }

    // An explicit --profile that doesn't exist is an error even with --host
    if let Some(name) = global.profile.as_deref() {
        let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name: name.into(),
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }

    // No profile -- build from flags / env vars alone
    let host = global.host.as_deref().ok_or_else(|| CliError::NoConfig {
        path: smartif_config::config_path().display().to_string(),
    })?;
    let profile = apply_overrides(Profile::new(host), global);
    Ok(profile.to_session_config(&cfg.defaults)?)
}

fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if global.port.is_some() {
        profile.port = global.port;
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    profile
}

//! Follow device state changes until interrupted.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use smartif_core::{DeviceKey, Session, SessionConfig, StateStore, SubscriptionGuard};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

/// How each change is printed. Decided once, shared by every callback.
#[derive(Clone, Copy)]
struct LineStyle {
    format: OutputFormat,
    color: bool,
    quiet: bool,
}

impl LineStyle {
    fn state_line(self, key: &str, store: &StateStore) -> Option<String> {
        if self.quiet {
            return None;
        }
        let now = Utc::now();
        let state = store.get(key)?;
        Some(match self.format {
            OutputFormat::Json | OutputFormat::JsonCompact => {
                json!({"at": now.to_rfc3339(), "key": key, "state": &*state}).to_string()
            }
            OutputFormat::Yaml => {
                format!("- at: {}\n  key: {key}\n  state: {state}", now.to_rfc3339())
            }
            OutputFormat::Table | OutputFormat::Plain => format!(
                "{} {} {state}",
                output::paint_dim(&now.format("%H:%M:%S").to_string(), self.color),
                output::paint_key(key, self.color),
            ),
        })
    }

    fn event_line(self, name: &str) -> Option<String> {
        if self.quiet {
            return None;
        }
        let now = Utc::now();
        Some(match self.format {
            OutputFormat::Json | OutputFormat::JsonCompact => {
                json!({"at": now.to_rfc3339(), "event": name}).to_string()
            }
            OutputFormat::Yaml => format!("- at: {}\n  event: {name}", now.to_rfc3339()),
            OutputFormat::Table | OutputFormat::Plain => format!(
                "{} event {}",
                output::paint_dim(&now.format("%H:%M:%S").to_string(), self.color),
                output::paint_key(name, self.color),
            ),
        })
    }
}

pub async fn handle(
    args: WatchArgs,
    mut config: SessionConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(ref raw) = args.push_url {
        config.push_url = Some(smartif_config::parse_push_url(raw)?);
    }
    if let Some(period) = args.poll_interval {
        config.poll_interval = period;
        config.retry_interval = period;
    }

    let style = LineStyle {
        format: global.output,
        color: output::should_color(global.color),
        quiet: global.quiet,
    };

    let session = Session::new(config)?;
    session.connect().await?;

    let store = Arc::clone(session.store());
    let keys: Vec<String> = if args.keys.is_empty() {
        store.keys().into_iter().map(DeviceKey::into_inner).collect()
    } else {
        args.keys
    };

    let mut guards: Vec<SubscriptionGuard> = Vec::with_capacity(keys.len() + args.events.len());
    for key in keys {
        if !store.contains(&key) {
            tracing::warn!(key = %key, "key not in the initial snapshot, waiting for it");
        }
        if let Some(line) = style.state_line(&key, &store) {
            println!("{line}");
        }
        let reader = Arc::clone(&store);
        let watched = key.clone();
        guards.push(
            session
                .subscribe(key, move || {
                    if let Some(line) = style.state_line(&watched, &reader) {
                        println!("{line}");
                    }
                })
                .drop_guard(),
        );
    }
    for name in args.events {
        let label = name.clone();
        guards.push(
            session
                .on_event(name, move || {
                    if let Some(line) = style.event_line(&label) {
                        println!("{line}");
                    }
                })
                .drop_guard(),
        );
    }

    tracing::info!(subscriptions = guards.len(), "watching, Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    drop(guards);
    session.disconnect().await;
    Ok(())
}

//! One-shot device state snapshot.

use std::collections::BTreeMap;

use serde::Serialize;
use tabled::Tabled;

use smartif_core::{CoreError, DeviceKey, Session, SessionConfig, StateBlob};

use crate::cli::{GlobalOpts, OutputFormat, StateArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct StateEntry {
    key: DeviceKey,
    state: StateBlob,
}

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&StateEntry> for StateRow {
    fn from(e: &StateEntry) -> Self {
        Self {
            key: e.key.to_string(),
            state: e.state.to_string(),
        }
    }
}

pub async fn handle(
    args: StateArgs,
    mut config: SessionConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // One fetch, no push: this command exits as soon as it has printed.
    config.initial_retries = 1;
    config.push_url = None;

    let session = Session::new(config)?;
    session.connect().await?;
    let result = collect(&session, &args.keys);
    let fetched_at = session.store().last_poll();
    session.disconnect().await;
    let entries = result?;

    let out = match global.output {
        OutputFormat::Table | OutputFormat::Plain => output::render_list(
            global.output,
            &entries,
            |e| StateRow::from(e),
            |e| format!("{}\t{}", e.key, e.state),
        )?,
        format => {
            let map: BTreeMap<&DeviceKey, &StateBlob> =
                entries.iter().map(|e| (&e.key, &e.state)).collect();
            output::render_single(format, &map, |_| String::new())?
        }
    };
    output::print_output(&out, global.quiet);

    if matches!(global.output, OutputFormat::Table) && !global.quiet {
        if let Some(at) = fetched_at {
            let line = format!("fetched {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
            eprintln!("{}", output::paint_dim(&line, output::should_color(global.color)));
        }
    }
    Ok(())
}

/// Requested keys in order, or every key sorted when none were given.
fn collect<C>(session: &Session<C>, keys: &[String]) -> Result<Vec<StateEntry>, CoreError>
where
    C: smartif_core::ControllerClient,
{
    let store = session.store();
    if keys.is_empty() {
        return Ok(store
            .keys()
            .into_iter()
            .filter_map(|key| {
                let state = store.get(key.as_str())?;
                Some(StateEntry {
                    key,
                    state: (*state).clone(),
                })
            })
            .collect());
    }

    keys.iter()
        .map(|key| {
            let state = store
                .get(key)
                .ok_or_else(|| CoreError::DeviceNotFound { key: key.clone() })?;
            Ok(StateEntry {
                key: DeviceKey::from(key.as_str()),
                state: (*state).clone(),
            })
        })
        .collect()
}

// Scripted controller used by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::client::ControllerClient;
use crate::error::CoreError;
use crate::key::{DeviceKey, Snapshot, StateBlob};

/// Replays queued fetch results; once the queue is empty every fetch
/// returns `fallback` (or a connection error when there is none).
#[derive(Default)]
pub(crate) struct ScriptedClient {
    script: Mutex<VecDeque<Result<Snapshot, CoreError>>>,
    fallback: Mutex<Option<Snapshot>>,
    fetches: AtomicU32,
    pub(crate) actions: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_ok(self, snapshot: Snapshot) -> Self {
        self.script.lock().unwrap_or_else(|e| e.into_inner()).push_back(Ok(snapshot));
        self
    }

    pub(crate) fn push_err(self, times: u32) -> Self {
        {
            let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
            for _ in 0..times {
                script.push_back(Err(unreachable_controller()));
            }
        }
        self
    }

    pub(crate) fn then_always(self, snapshot: Snapshot) -> Self {
        *self.fallback.lock().unwrap_or_else(|e| e.into_inner()) = Some(snapshot);
        self
    }

    pub(crate) fn fetches(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ControllerClient for ScriptedClient {
    async fn fetch_snapshot(&self) -> Result<Snapshot, CoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next {
            Some(result) => result,
            None => self
                .fallback
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
                .ok_or_else(unreachable_controller),
        }
    }

    async fn perform_action(&self, path: &str, _params: &[(&str, String)]) -> Result<(), CoreError> {
        self.actions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_owned());
        Ok(())
    }
}

pub(crate) fn unreachable_controller() -> CoreError {
    CoreError::ConnectionFailed {
        url: "http://10.0.0.5:42443/".into(),
        reason: "connection refused".into(),
    }
}

pub(crate) fn snapshot(entries: &[(&str, StateBlob)]) -> Snapshot {
    entries
        .iter()
        .map(|(k, v)| (DeviceKey::from(*k), v.clone()))
        .collect()
}

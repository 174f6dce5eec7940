//! Lifecycle worker test utilities

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;

use modkeeper::catalog::types::{Artifact, Mod};
use modkeeper::service::worker::{ActionCallback, LifecycleWorker, WorkerError};

/// Worker that records every call and fails for selected mods
#[derive(Default)]
pub struct RecordingWorker {
    calls: Mutex<Vec<String>>,
    failing: HashSet<String>,
}

impl RecordingWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    /// Calls as `"<operation> <id> [<version>]"`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String, id: &str) -> Result<(), WorkerError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.contains(id) {
            return Err(WorkerError::Download(format!("{id} unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl LifecycleWorker for RecordingWorker {
    async fn install(&self, entry: &Mod, artifact: &Artifact) -> Result<(), WorkerError> {
        self.record(format!("install {} {}", entry.id, artifact.version), &entry.id)
    }

    async fn update(&self, entry: &Mod, artifact: &Artifact) -> Result<(), WorkerError> {
        self.record(format!("update {} {}", entry.id, artifact.version), &entry.id)
    }

    async fn remove(&self, entry: &Mod) -> Result<(), WorkerError> {
        self.record(format!("remove {}", entry.id), &entry.id)
    }
}

/// Worker whose installs block until `release` is called
#[derive(Default)]
pub struct GatedWorker {
    gate: Notify,
}

impl GatedWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl LifecycleWorker for GatedWorker {
    async fn install(&self, _entry: &Mod, _artifact: &Artifact) -> Result<(), WorkerError> {
        self.gate.notified().await;
        Ok(())
    }

    async fn update(&self, _entry: &Mod, _artifact: &Artifact) -> Result<(), WorkerError> {
        self.gate.notified().await;
        Ok(())
    }

    async fn remove(&self, _entry: &Mod) -> Result<(), WorkerError> {
        self.gate.notified().await;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(String),
}

/// Callback recording each notification it receives
#[derive(Default)]
pub struct RecordingCallback {
    outcomes: Mutex<Vec<Outcome>>,
}

impl RecordingCallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl ActionCallback for RecordingCallback {
    fn on_success(&self) {
        self.outcomes.lock().unwrap().push(Outcome::Success);
    }

    fn on_failure(&self, error: &WorkerError) {
        self.outcomes
            .lock()
            .unwrap()
            .push(Outcome::Failure(error.to_string()));
    }
}

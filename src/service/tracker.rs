//! Per-mod lifecycle operation state

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::service::worker::WorkerError;

/// Lifecycle operation currently tracked for a mod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcessState {
    #[default]
    None,
    Install,
    Update,
    Remove,
    Errored,
}

impl ProcessState {
    /// Whether an operation is in flight
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            ProcessState::Install | ProcessState::Update | ProcessState::Remove
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessState::None => "none",
            ProcessState::Install => "install",
            ProcessState::Update => "update",
            ProcessState::Remove => "remove",
            ProcessState::Errored => "errored",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
struct Processes {
    states: HashMap<String, ProcessState>,
    errors: HashMap<String, Arc<WorkerError>>,
}

/// Thread-safe map from mod id to its operation state and last error
///
/// Absence of an id is equivalent to [`ProcessState::None`].
#[derive(Debug, Default)]
pub struct OperationTracker {
    processes: Mutex<Processes>,
}

impl OperationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // Every critical section leaves both maps consistent, so a poisoned
    // lock still holds valid data.
    fn lock(&self) -> MutexGuard<'_, Processes> {
        self.processes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically move `id` into `state` unless an operation is already running
    ///
    /// Starting a new operation discards the previously captured error.
    ///
    /// # Returns
    /// * `Ok(())` - The state was recorded
    /// * `Err(current)` - An operation is in flight; nothing changed
    pub fn try_begin(&self, id: &str, state: ProcessState) -> Result<(), ProcessState> {
        let mut processes = self.lock();
        let current = processes
            .states
            .get(id)
            .copied()
            .unwrap_or_default();
        if current.is_running() {
            return Err(current);
        }
        processes.states.insert(id.to_string(), state);
        processes.errors.remove(id);
        Ok(())
    }

    pub fn get_process_type(&self, id: &str) -> ProcessState {
        self.lock().states.get(id).copied().unwrap_or_default()
    }

    /// Reset `id` to [`ProcessState::None`]; a captured error is kept
    pub fn remove_process(&self, id: &str) {
        self.lock().states.remove(id);
    }

    pub fn set_errored(&self, id: &str, error: Arc<WorkerError>) {
        let mut processes = self.lock();
        processes
            .states
            .insert(id.to_string(), ProcessState::Errored);
        processes.errors.insert(id.to_string(), error);
    }

    /// Last captured error for `id`, left in place
    pub fn get_error(&self, id: &str) -> Option<Arc<WorkerError>> {
        self.lock().errors.get(id).cloned()
    }

    /// Last captured error for `id`, cleared on read
    pub fn take_error(&self, id: &str) -> Option<Arc<WorkerError>> {
        self.lock().errors.remove(id)
    }
}

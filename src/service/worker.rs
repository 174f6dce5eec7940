//! Lifecycle worker abstractions
//!
//! The file operations behind install, update and remove live outside this
//! crate; the service only schedules them and records their outcome.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::catalog::error::StorageError;
use crate::catalog::types::{Artifact, Mod};
use crate::version::error::VersionError;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("No compatible version of {0} available")]
    NoCompatibleVersion(String),

    #[error("Mod {0} is not installed")]
    NotInstalled(String),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker pool closed")]
    PoolClosed,

    #[error("Worker panicked: {0}")]
    Panicked(String),
}

/// Performs the actual work of a lifecycle operation
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LifecycleWorker: Send + Sync + 'static {
    async fn install(&self, entry: &Mod, artifact: &Artifact) -> Result<(), WorkerError>;

    /// Replace the installed copy of `entry` with `artifact`
    async fn update(&self, entry: &Mod, artifact: &Artifact) -> Result<(), WorkerError>;

    async fn remove(&self, entry: &Mod) -> Result<(), WorkerError>;
}

/// Completion notification for a launched operation, invoked exactly once
#[cfg_attr(test, automock)]
pub trait ActionCallback: Send + Sync {
    fn on_success(&self);

    fn on_failure(&self, error: &WorkerError);
}

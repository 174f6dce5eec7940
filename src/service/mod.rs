//! Mod manager façade
//!
//! Ties the catalog, local state and host platform together and launches
//! lifecycle operations on a bounded worker pool.
//!
//! # Modules
//!
//! - [`tracker`]: Per-mod operation state and captured errors
//! - [`worker`]: Lifecycle worker and completion callback traits

pub mod tracker;
pub mod worker;

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::catalog::database::ModDatabase;
use crate::catalog::error::StorageError;
use crate::catalog::types::{Artifact, Mod};
use crate::local::host::HostPlatform;
use crate::local::storage::LocalStorage;
use crate::version::error::VersionError;
use crate::version::resolver;
use tracker::{OperationTracker, ProcessState};
use worker::{ActionCallback, LifecycleWorker, WorkerError};

/// Baseline below every possible version, so any eligible artifact qualifies
const LOWEST_VERSION: &str = "0.0.0-0";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Mod {id} is busy ({state})")]
    Busy { id: String, state: ProcessState },

    #[error("No lifecycle worker configured")]
    NoWorker,

    #[error("Operations must be launched from within a Tokio runtime")]
    NoRuntime,
}

#[derive(Clone)]
struct WorkerPool {
    worker: Arc<dyn LifecycleWorker>,
    permits: Arc<Semaphore>,
}

/// Entry point for catalog queries and lifecycle operations
#[derive(Clone)]
pub struct ModManagerService {
    database: Arc<dyn ModDatabase>,
    storage: Arc<dyn LocalStorage>,
    host: Arc<dyn HostPlatform>,
    pool: Option<WorkerPool>,
    tracker: Arc<OperationTracker>,
}

impl ModManagerService {
    /// Create a query-only service; attach a worker with [`Self::with_worker`]
    /// before launching operations
    pub fn new(
        database: Arc<dyn ModDatabase>,
        storage: Arc<dyn LocalStorage>,
        host: Arc<dyn HostPlatform>,
    ) -> Self {
        Self {
            database,
            storage,
            host,
            pool: None,
            tracker: Arc::new(OperationTracker::new()),
        }
    }

    /// Run lifecycle operations on `worker`, at most `max_concurrent` at a time
    pub fn with_worker(mut self, worker: Arc<dyn LifecycleWorker>, max_concurrent: usize) -> Self {
        self.pool = Some(WorkerPool {
            worker,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        });
        self
    }

    pub fn query_mods(&self, name: &str) -> Result<Vec<Mod>, StorageError> {
        self.database.query_mods(name)
    }

    pub fn get_compatible_mods(&self) -> Result<Vec<Mod>, StorageError> {
        self.database.get_all_mods()
    }

    pub fn is_installed(&self, id: &str) -> Result<bool, StorageError> {
        self.storage.is_installed(id)
    }

    /// Newest artifact of `entry` above `version` for the running platform
    pub fn latest_compatible<'a>(
        &self,
        entry: &'a Mod,
        version: &str,
        loose: bool,
    ) -> Result<Option<&'a Artifact>, VersionError> {
        resolver::latest_compatible(entry, version, &self.host.platform_version(), loose)
    }

    /// Whether a newer compatible artifact than `installed_version` exists
    ///
    /// Unknown ids, a newer locally recorded install and lookup failures all
    /// count as "not outdated".
    pub fn is_outdated(&self, id: &str, installed_version: &str) -> bool {
        let entry = match self.database.get_mod_by_id(id) {
            Ok(Some(entry)) => entry,
            Ok(None) => return false,
            Err(e) => {
                warn!("Failed to look up {}: {}", id, e);
                return false;
            }
        };

        match self.storage.is_newer_version_installed(id, installed_version) {
            Ok(true) => {
                debug!("A version of {} newer than {} is already installed", id, installed_version);
                return false;
            }
            Ok(false) => {}
            Err(e) => warn!("Failed to read installed version of {}: {}", id, e),
        }

        match self.latest_compatible(&entry, installed_version, false) {
            Ok(latest) => latest.is_some(),
            Err(e) => {
                warn!("Cannot resolve latest version of {}: {}", id, e);
                false
            }
        }
    }

    /// [`Self::is_outdated`] for the version of `entry` currently installed
    pub fn is_mod_outdated(&self, entry: &Mod) -> bool {
        match self.installed_version(&entry.id) {
            Ok(Some(version)) => self.is_outdated(&entry.id, &version),
            Ok(None) => false,
            Err(e) => {
                warn!("Failed to read installed version of {}: {}", entry.id, e);
                false
            }
        }
    }

    pub fn get_process_type(&self, id: &str) -> ProcessState {
        self.tracker.get_process_type(id)
    }

    pub fn remove_process(&self, id: &str) {
        self.tracker.remove_process(id);
    }

    pub fn set_errored(&self, id: &str, error: Arc<WorkerError>) {
        self.tracker.set_errored(id, error);
    }

    pub fn get_error(&self, id: &str) -> Option<Arc<WorkerError>> {
        self.tracker.get_error(id)
    }

    /// Install the newest artifact of `entry`
    ///
    /// With `force`, artifacts whose compatibility range excludes the running
    /// platform are eligible too. The tracked state is INSTALL once this
    /// returns.
    pub fn launch_install(
        &self,
        entry: &Mod,
        force: bool,
        callback: Arc<dyn ActionCallback>,
    ) -> Result<JoinHandle<()>, ServiceError> {
        let (pool, runtime) = self.begin(&entry.id, ProcessState::Install)?;
        info!("Installing {} (force: {})", entry.id, force);

        let service = self.clone();
        let entry = entry.clone();
        let worker = Arc::clone(&pool.worker);
        Ok(self.spawn(runtime, pool, entry.id.clone(), callback, async move {
            service.install(&entry, force, worker.as_ref()).await
        }))
    }

    /// Update `entry` to the newest artifact compatible with the running platform
    pub fn launch_update(
        &self,
        entry: &Mod,
        callback: Arc<dyn ActionCallback>,
    ) -> Result<JoinHandle<()>, ServiceError> {
        let (pool, runtime) = self.begin(&entry.id, ProcessState::Update)?;
        info!("Updating {}", entry.id);

        let service = self.clone();
        let entry = entry.clone();
        let worker = Arc::clone(&pool.worker);
        Ok(self.spawn(runtime, pool, entry.id.clone(), callback, async move {
            service.update(&entry, worker.as_ref()).await
        }))
    }

    pub fn launch_remove(
        &self,
        entry: &Mod,
        callback: Arc<dyn ActionCallback>,
    ) -> Result<JoinHandle<()>, ServiceError> {
        let (pool, runtime) = self.begin(&entry.id, ProcessState::Remove)?;
        info!("Removing {}", entry.id);

        let service = self.clone();
        let entry = entry.clone();
        let worker = Arc::clone(&pool.worker);
        Ok(self.spawn(runtime, pool, entry.id.clone(), callback, async move {
            service.remove(&entry, worker.as_ref()).await
        }))
    }

    /// Record `state` for `id` once everything needed to run the operation is available
    fn begin(&self, id: &str, state: ProcessState) -> Result<(WorkerPool, Handle), ServiceError> {
        let pool = self.pool.clone().ok_or(ServiceError::NoWorker)?;
        let runtime = Handle::try_current().map_err(|_| ServiceError::NoRuntime)?;
        self.tracker
            .try_begin(id, state)
            .map_err(|current| ServiceError::Busy {
                id: id.to_string(),
                state: current,
            })?;
        Ok((pool, runtime))
    }

    fn spawn<F>(
        &self,
        runtime: Handle,
        pool: WorkerPool,
        id: String,
        callback: Arc<dyn ActionCallback>,
        operation: F,
    ) -> JoinHandle<()>
    where
        F: Future<Output = Result<(), WorkerError>> + Send + 'static,
    {
        let tracker = Arc::clone(&self.tracker);
        runtime.spawn(async move {
            let result = match pool.permits.acquire().await {
                Ok(permit) => {
                    let result = AssertUnwindSafe(operation)
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|payload| Err(WorkerError::Panicked(panic_message(payload))));
                    drop(permit);
                    result
                }
                Err(_) => Err(WorkerError::PoolClosed),
            };

            match result {
                Ok(()) => {
                    info!("Finished {} of {}", tracker.get_process_type(&id), id);
                    tracker.remove_process(&id);
                    callback.on_success();
                }
                Err(e) => {
                    error!("{} of {} failed: {}", tracker.get_process_type(&id), id, e);
                    let e = Arc::new(e);
                    tracker.set_errored(&id, Arc::clone(&e));
                    callback.on_failure(&e);
                }
            }
        })
    }

    async fn install(
        &self,
        entry: &Mod,
        force: bool,
        worker: &dyn LifecycleWorker,
    ) -> Result<(), WorkerError> {
        let artifact = self
            .latest_compatible(entry, LOWEST_VERSION, force)?
            .ok_or_else(|| WorkerError::NoCompatibleVersion(entry.id.clone()))?;

        worker.install(entry, artifact).await?;
        self.storage.record_installed(&entry.id, artifact)?;
        Ok(())
    }

    async fn update(&self, entry: &Mod, worker: &dyn LifecycleWorker) -> Result<(), WorkerError> {
        let installed = self
            .installed_version(&entry.id)?
            .ok_or_else(|| WorkerError::NotInstalled(entry.id.clone()))?;
        let artifact = self
            .latest_compatible(entry, &installed, false)?
            .ok_or_else(|| WorkerError::NoCompatibleVersion(entry.id.clone()))?;

        worker.update(entry, artifact).await?;
        self.storage.record_installed(&entry.id, artifact)?;
        Ok(())
    }

    async fn remove(&self, entry: &Mod, worker: &dyn LifecycleWorker) -> Result<(), WorkerError> {
        worker.remove(entry).await?;
        self.storage.mark_uninstalled(&entry.id)?;
        Ok(())
    }

    /// Version recorded by local storage, falling back to what the host reports
    pub fn installed_version(&self, id: &str) -> Result<Option<String>, StorageError> {
        if let Some(version) = self.storage.get_installed_version(id)? {
            return Ok(Some(version));
        }
        Ok(self
            .host
            .component(id)
            .map(|component| component.version.to_string()))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

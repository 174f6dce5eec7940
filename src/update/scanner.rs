//! Background scan for newer releases of installed mods

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::catalog::error::CatalogError;
use crate::catalog::provider::ModProvider;
use crate::catalog::types::{ModVersion, VersionType};
use crate::config::{DEFAULT_EXCLUDED_IDS, SCAN_STAGGER_DELAY_MS};
use crate::local::host::{HostPlatform, InstalledComponent};
use crate::version::semver::{SemanticVersion, parse_loose};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Mod {component_id} not found on {provider}")]
    ModNotFoundInCatalog {
        component_id: String,
        provider: String,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// A newer release found for one installed component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableUpdate {
    /// Catalog identifier the component was matched to
    pub mod_id: String,
    /// Identifier the host knows the component by
    pub component_id: String,
    pub version: ModVersion,
}

/// Result of one scan run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    updates: Vec<AvailableUpdate>,
}

impl UpdateReport {
    pub fn new(updates: Vec<AvailableUpdate>) -> Self {
        Self { updates }
    }

    /// Whether an update is known for either id (ids may diverge between the
    /// catalog and the host, so matching either one is enough)
    pub fn has_update(&self, catalog_id: &str, component_id: &str) -> bool {
        self.updates.iter().any(|update| {
            update.mod_id.eq_ignore_ascii_case(catalog_id)
                || update.component_id.eq_ignore_ascii_case(component_id)
        })
    }

    pub fn any_updates_available(&self) -> bool {
        !self.updates.is_empty()
    }

    pub fn get_update(&self, catalog_id: &str) -> Option<&ModVersion> {
        self.updates
            .iter()
            .find(|update| update.mod_id.eq_ignore_ascii_case(catalog_id))
            .map(|update| &update.version)
    }

    pub fn updates(&self) -> &[AvailableUpdate] {
        &self.updates
    }
}

/// Cross-references installed components with a remote catalog
pub struct UpdateScanner {
    provider: Arc<dyn ModProvider>,
    host: Arc<dyn HostPlatform>,
    excluded_ids: Vec<String>,
    stagger_delay: Duration,
}

impl UpdateScanner {
    pub fn new(provider: Arc<dyn ModProvider>, host: Arc<dyn HostPlatform>) -> Self {
        Self {
            provider,
            host,
            excluded_ids: DEFAULT_EXCLUDED_IDS.iter().map(|id| id.to_string()).collect(),
            stagger_delay: Duration::from_millis(SCAN_STAGGER_DELAY_MS),
        }
    }

    /// Replace the set of component ids that are never checked
    pub fn with_excluded_ids(mut self, excluded_ids: Vec<String>) -> Self {
        self.excluded_ids = excluded_ids;
        self
    }

    pub fn with_stagger_delay(mut self, stagger_delay: Duration) -> Self {
        self.stagger_delay = stagger_delay;
        self
    }

    /// Run the scan on a background task
    pub fn spawn(self) -> JoinHandle<UpdateReport> {
        tokio::spawn(async move { self.scan().await })
    }

    /// Check every installed component for a newer release
    ///
    /// Components are looked up concurrently with staggered start times.
    /// Failures are logged and only skip the component concerned.
    pub async fn scan(&self) -> UpdateReport {
        let release_target = self.host.release_target();
        let release_target = release_target.as_str();

        let components: Vec<InstalledComponent> = self
            .host
            .installed_components()
            .into_iter()
            .filter(|component| !self.excluded_ids.contains(&component.id))
            .filter(|component| {
                let exists = component.exists();
                if !exists {
                    debug!("Skipping {}: {:?} does not exist", component.id, component.path);
                }
                exists
            })
            .collect();

        info!(
            "Checking {} installed mods for {} updates on {}",
            components.len(),
            release_target,
            self.provider.name()
        );

        let futures = components.iter().enumerate().map(|(i, component)| {
            let delay = self.stagger_delay * i as u32;
            async move {
                sleep(delay).await;
                self.check_component(component, release_target).await
            }
        });

        let updates: Vec<AvailableUpdate> = join_all(futures).await.into_iter().flatten().collect();

        info!("Found {} available updates", updates.len());
        UpdateReport::new(updates)
    }

    async fn check_component(
        &self,
        component: &InstalledComponent,
        release_target: &str,
    ) -> Option<AvailableUpdate> {
        let Some(installed) = component.version.as_semantic() else {
            warn!(
                "Update checking for mod {} not supported because it has no semantic version scheme",
                component.id
            );
            return None;
        };

        match self.find_update(component, installed, release_target).await {
            Ok(Some(update)) => {
                info!(
                    "Update for {} available: {} -> {}",
                    component.id, installed, update.version.version
                );
                Some(update)
            }
            Ok(None) => {
                info!("No update for {} found", component.id);
                None
            }
            Err(e) => {
                error!("Failed to check for updates for {}: {}", component.id, e);
                None
            }
        }
    }

    async fn find_update(
        &self,
        component: &InstalledComponent,
        installed: &SemanticVersion,
        release_target: &str,
    ) -> Result<Option<AvailableUpdate>, ScanError> {
        let mod_id = self.find_mod_id(component).await?;
        let versions = self.provider.get_versions_for_mod(&mod_id).await?;

        Ok(
            select_update(versions, installed, release_target).map(|version| AvailableUpdate {
                mod_id,
                component_id: component.id.clone(),
                version,
            }),
        )
    }

    /// Resolve the catalog id of a component by searching for its display name
    async fn find_mod_id(&self, component: &InstalledComponent) -> Result<String, ScanError> {
        let hits = self.provider.search(&component.name, 0, 1).await?;
        hits.into_iter()
            .next()
            .map(|hit| hit.id)
            .ok_or_else(|| ScanError::ModNotFoundInCatalog {
                component_id: component.id.clone(),
                provider: self.provider.name().to_string(),
            })
    }
}

/// Pick the greatest release-channel version for `release_target` that is
/// strictly newer than `installed`.
pub fn select_update(
    versions: Vec<ModVersion>,
    installed: &SemanticVersion,
    release_target: &str,
) -> Option<ModVersion> {
    versions
        .into_iter()
        .filter(|v| v.version_type == VersionType::Release && v.supports(release_target))
        .filter_map(|v| match parse_loose(&v.version) {
            Ok(parsed) => Some((parsed, v)),
            Err(e) => {
                debug!("Ignoring catalog version {}: {}", v.version, e);
                None
            }
        })
        .filter(|(parsed, _)| parsed > installed)
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, version)| version)
}

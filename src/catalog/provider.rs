//! Provider trait for querying a remote mod catalog

#[cfg(test)]
use mockall::automock;

use crate::catalog::error::CatalogError;
use crate::catalog::types::{ModVersion, SummarizedMod};

/// Trait for searching a remote catalog and listing published versions
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ModProvider: Send + Sync {
    /// Human readable name of the catalog (used in log messages)
    fn name(&self) -> &'static str;

    /// Search mods by name
    ///
    /// # Arguments
    /// * `query` - Free text, usually the display name of an installed mod
    /// * `offset` - Number of hits to skip
    /// * `limit` - Maximum number of hits to return
    async fn search(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SummarizedMod>, CatalogError>;

    /// Fetch every published version of a mod
    ///
    /// # Returns
    /// * `Ok(Vec<ModVersion>)` - Versions in catalog order
    /// * `Err(CatalogError)` - If the fetch fails
    async fn get_versions_for_mod(&self, id: &str) -> Result<Vec<ModVersion>, CatalogError>;
}

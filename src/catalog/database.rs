//! Local catalog storage abstraction

#[cfg(test)]
use mockall::automock;

use crate::catalog::error::StorageError;
use crate::catalog::types::Mod;

/// Trait for reading mods from the locally synchronized catalog
#[cfg_attr(test, automock)]
pub trait ModDatabase: Send + Sync + 'static {
    /// Mods whose id or name contains `name` (case-insensitive)
    fn query_mods(&self, name: &str) -> Result<Vec<Mod>, StorageError>;

    /// Look up a single mod with all its artifacts
    fn get_mod_by_id(&self, id: &str) -> Result<Option<Mod>, StorageError>;

    /// Every mod in the catalog
    fn get_all_mods(&self) -> Result<Vec<Mod>, StorageError>;
}

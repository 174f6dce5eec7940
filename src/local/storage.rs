//! Records of mods installed through this tool

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::error::StorageError;
use crate::catalog::types::Artifact;
use crate::version::semver::parse_loose;

/// Trait for storing which mods are installed and at which version
#[cfg_attr(test, automock)]
pub trait LocalStorage: Send + Sync + 'static {
    fn is_installed(&self, id: &str) -> Result<bool, StorageError>;

    fn get_installed_version(&self, id: &str) -> Result<Option<String>, StorageError>;

    /// Whether the recorded version of `id` is newer than `version`
    fn is_newer_version_installed(&self, id: &str, version: &str) -> Result<bool, StorageError>;

    fn mark_uninstalled(&self, id: &str) -> Result<(), StorageError>;

    fn record_installed(&self, id: &str, artifact: &Artifact) -> Result<(), StorageError>;
}

/// Marker stored for each installed mod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledRecord {
    pub id: String,
    pub version: String,
    pub download_url: String,
    pub installed_at: DateTime<Utc>,
}

/// Stores one `<id>.json` marker per installed mod in a directory
pub struct FsLocalStorage {
    dir: PathBuf,
}

impl FsLocalStorage {
    pub fn new(dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn marker_path(&self, id: &str) -> Result<PathBuf, StorageError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !id.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    pub fn get_record(&self, id: &str) -> Result<Option<InstalledRecord>, StorageError> {
        let path = self.marker_path(id)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl LocalStorage for FsLocalStorage {
    fn is_installed(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.marker_path(id)?.exists())
    }

    fn get_installed_version(&self, id: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get_record(id)?.map(|record| record.version))
    }

    fn is_newer_version_installed(&self, id: &str, version: &str) -> Result<bool, StorageError> {
        let Some(installed) = self.get_installed_version(id)? else {
            return Ok(false);
        };

        match (parse_loose(&installed), parse_loose(version)) {
            (Ok(installed), Ok(version)) => Ok(installed > version),
            _ => {
                debug!(
                    "Cannot compare installed version {} of {} with {}",
                    installed, id, version
                );
                Ok(false)
            }
        }
    }

    fn mark_uninstalled(&self, id: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.marker_path(id)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn record_installed(&self, id: &str, artifact: &Artifact) -> Result<(), StorageError> {
        let record = InstalledRecord {
            id: id.to_string(),
            version: artifact.version.clone(),
            download_url: artifact.download_url.clone(),
            installed_at: Utc::now(),
        };
        let path = self.marker_path(id)?;
        std::fs::write(&path, serde_json::to_vec_pretty(&record)?)?;
        debug!("Recorded {} {} at {:?}", id, record.version, path);
        Ok(())
    }
}

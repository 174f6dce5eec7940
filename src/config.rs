use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::modrinth::DEFAULT_BASE_URL;

// =============================================================================
// Concurrency-related constants
// =============================================================================

/// Default number of install/update/remove operations allowed to run at once
pub const DEFAULT_MAX_CONCURRENT_OPERATIONS: usize = 4;

/// Delay between starting each catalog lookup during a scan to avoid rate limiting (10ms)
pub const SCAN_STAGGER_DELAY_MS: u64 = 10;

/// Components the update scanner never offers as updatable mods
pub const DEFAULT_EXCLUDED_IDS: &[&str] = &["java", "minecraft"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Application configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub catalog: CatalogConfig,
    pub workers: WorkerConfig,
    pub scanner: ScannerConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a JSON file; missing fields use defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Remote catalog configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogConfig {
    pub base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Lifecycle worker pool configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkerConfig {
    pub max_concurrent: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT_OPERATIONS,
        }
    }
}

/// Update scanner configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ScannerConfig {
    pub excluded_ids: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            excluded_ids: DEFAULT_EXCLUDED_IDS.iter().map(|id| id.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write log lines as JSON objects
    pub json: bool,
}

/// Returns the path to the data directory for modkeeper.
/// Uses $XDG_DATA_HOME/modkeeper if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/modkeeper,
/// or ./modkeeper if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the catalog database file.
pub fn db_path() -> PathBuf {
    data_dir().join("catalog.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("modkeeper.log")
}

/// Returns the directory holding installed-mod markers.
pub fn installed_dir() -> PathBuf {
    data_dir().join("installed")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("modkeeper")
}

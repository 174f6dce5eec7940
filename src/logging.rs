//! Tracing subscriber setup

use std::path::Path;

use anyhow::anyhow;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive (e.g., "modkeeper=debug")
pub const LOG_ENV: &str = "MODKEEPER_LOG";

const DEFAULT_FILTER: &str = "info";

/// Install a global subscriber writing to `log_path`
///
/// The returned guard flushes buffered lines on drop, so keep it alive for
/// the lifetime of the process.
pub fn init(log_path: &Path, json: bool) -> anyhow::Result<WorkerGuard> {
    let dir = log_path
        .parent()
        .ok_or_else(|| anyhow!("Log path has no parent directory: {}", log_path.display()))?;
    let file_name = log_path
        .file_name()
        .ok_or_else(|| anyhow!("Log path has no file name: {}", log_path.display()))?;
    std::fs::create_dir_all(dir)?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .try_init()
    };
    result.map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}

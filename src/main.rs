use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use modkeeper::catalog::modrinth::ModrinthProvider;
use modkeeper::catalog::sqlite::SqliteDatabase;
use modkeeper::catalog::types::Mod;
use modkeeper::config::{self, Config};
use modkeeper::local::host::{HostPlatform, ManifestHost};
use modkeeper::local::storage::FsLocalStorage;
use modkeeper::logging;
use modkeeper::service::ModManagerService;
use modkeeper::update::scanner::UpdateScanner;

#[derive(Parser)]
#[command(name = "modkeeper")]
#[command(version, about = "Keeps installed mods compatible and up to date")]
struct Cli {
    /// Path to a JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace the local catalog with the mods in a JSON file
    Import { catalog: PathBuf },
    /// Look for newer releases of installed mods in the remote catalog
    Scan {
        /// Host manifest describing the platform and its installed components
        #[arg(long)]
        host: PathBuf,
    },
    /// Check installed mods against the local catalog
    Outdated {
        #[arg(long)]
        host: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    let _guard = logging::init(&config::log_path(), config.logging.json)?;

    match cli.command {
        Command::Import { catalog } => import(&catalog),
        Command::Scan { host } => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(scan(&config, &host)),
        Command::Outdated { host } => outdated(&host),
    }
}

fn import(path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let mods: Vec<Mod> = serde_json::from_str(&content)?;

    let database = SqliteDatabase::new(&config::db_path())?;
    database.replace_mods(&mods)?;

    info!("Imported {} mods from {}", mods.len(), path.display());
    println!("Imported {} mods", mods.len());
    Ok(())
}

async fn scan(config: &Config, host: &Path) -> anyhow::Result<()> {
    let host = ManifestHost::load(host)?;
    let provider = ModrinthProvider::new(&config.catalog.base_url);

    let report = UpdateScanner::new(Arc::new(provider), Arc::new(host))
        .with_excluded_ids(config.scanner.excluded_ids.clone())
        .spawn()
        .await?;

    if !report.any_updates_available() {
        println!("All mods are up to date");
        return Ok(());
    }
    for update in report.updates() {
        println!(
            "{} ({}): {} available",
            update.component_id, update.mod_id, update.version.version
        );
    }
    Ok(())
}

fn outdated(host: &Path) -> anyhow::Result<()> {
    let host = Arc::new(ManifestHost::load(host)?);
    let service = ModManagerService::new(
        Arc::new(SqliteDatabase::new(&config::db_path())?),
        Arc::new(FsLocalStorage::new(&config::installed_dir())?),
        host.clone(),
    );

    for entry in service.get_compatible_mods()? {
        let Some(installed) = service.installed_version(&entry.id)? else {
            continue;
        };

        if !service.is_mod_outdated(&entry) {
            println!("{} {}: up to date", entry.id, installed);
            continue;
        }
        match service.latest_compatible(&entry, &installed, false)? {
            Some(latest) => println!(
                "{} {}: {} available for {}",
                entry.id,
                installed,
                latest.version,
                host.platform_version()
            ),
            None => println!("{} {}: up to date", entry.id, installed),
        }
    }
    Ok(())
}

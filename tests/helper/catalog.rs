//! Catalog test utilities

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use modkeeper::catalog::error::CatalogError;
use modkeeper::catalog::provider::ModProvider;
use modkeeper::catalog::sqlite::SqliteDatabase;
use modkeeper::catalog::types::{Artifact, Mod, ModVersion, SummarizedMod, VersionType};

/// In-memory remote catalog
#[derive(Default)]
pub struct FakeProvider {
    projects: Vec<SummarizedMod>,
    versions: HashMap<String, Vec<ModVersion>>,
    searches: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, id: &str, name: &str, versions: Vec<ModVersion>) -> Self {
        self.projects.push(SummarizedMod {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            author: String::new(),
            icon_url: None,
        });
        self.versions.insert(id.to_string(), versions);
        self
    }

    /// Queries received by `search`, in call order
    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "Fake"
    }

    async fn search(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SummarizedMod>, CatalogError> {
        self.searches.lock().unwrap().push(query.to_string());
        Ok(self
            .projects
            .iter()
            .filter(|project| project.name.eq_ignore_ascii_case(query))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_versions_for_mod(&self, id: &str) -> Result<Vec<ModVersion>, CatalogError> {
        self.versions
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }
}

pub fn mod_version(version: &str, version_type: VersionType, game_versions: &[&str]) -> ModVersion {
    ModVersion {
        id: format!("v-{version}"),
        version: version.to_string(),
        version_type,
        game_versions: game_versions.iter().map(|v| v.to_string()).collect(),
        download_url: Some(format!("https://cdn.example.com/{version}.jar")),
    }
}

pub fn artifact(version: &str, compatibility: Option<&str>) -> Artifact {
    Artifact {
        version: version.to_string(),
        compatibility: compatibility.map(str::to_string),
        download_url: format!("https://cdn.example.com/{version}.jar"),
        version_type: VersionType::Release,
    }
}

pub fn make_mod(id: &str, name: &str, artifacts: Vec<Artifact>) -> Mod {
    Mod {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} description"),
        author: "someone".to_string(),
        icon_url: None,
        artifacts,
    }
}

/// Create a test database pre-populated with `mods`
pub fn create_test_database(mods: &[Mod]) -> (TempDir, Arc<SqliteDatabase>) {
    let temp_dir = TempDir::new().unwrap();
    let database = SqliteDatabase::new(&temp_dir.path().join("catalog.db")).unwrap();
    database.replace_mods(mods).unwrap();
    (temp_dir, Arc::new(database))
}

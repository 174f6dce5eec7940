//! Host platform introspection

use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;
use serde::Deserialize;

use crate::catalog::error::StorageError;
use crate::version::semver::{SemanticVersion, parse_loose};

/// Version an installed component declares about itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredVersion {
    Semantic(SemanticVersion),
    /// Any other scheme (dates, commit hashes, `${version}` placeholders, ...)
    Opaque(String),
}

impl DeclaredVersion {
    pub fn classify(raw: &str) -> Self {
        match parse_loose(raw) {
            Ok(version) => DeclaredVersion::Semantic(version),
            Err(_) => DeclaredVersion::Opaque(raw.to_string()),
        }
    }

    pub fn as_semantic(&self) -> Option<&SemanticVersion> {
        match self {
            DeclaredVersion::Semantic(version) => Some(version),
            DeclaredVersion::Opaque(_) => None,
        }
    }
}

impl fmt::Display for DeclaredVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredVersion::Semantic(version) => version.fmt(f),
            DeclaredVersion::Opaque(raw) => f.write_str(raw),
        }
    }
}

/// A component the host platform has loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledComponent {
    /// Identifier the host knows the component by (may differ from the catalog id)
    pub id: String,
    /// Display name, used to look the component up in a remote catalog
    pub name: String,
    pub version: DeclaredVersion,
    pub path: PathBuf,
}

impl InstalledComponent {
    /// Whether the component is still present on disk (symlinks are not followed)
    pub fn exists(&self) -> bool {
        std::fs::symlink_metadata(&self.path).is_ok()
    }
}

/// Trait for inspecting the running host platform
#[cfg_attr(test, automock)]
pub trait HostPlatform: Send + Sync + 'static {
    fn installed_components(&self) -> Vec<InstalledComponent>;

    /// Find an installed component by its host id
    fn component(&self, id: &str) -> Option<InstalledComponent> {
        self.installed_components().into_iter().find(|c| c.id == id)
    }

    /// Full version of the running platform (e.g., "1.18.1")
    fn platform_version(&self) -> String;

    /// Release the platform belongs to, as catalogs label supported versions
    fn release_target(&self) -> String;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostManifest {
    platform_version: String,
    #[serde(default)]
    release_target: Option<String>,
    #[serde(default)]
    components: Vec<ComponentEntry>,
}

#[derive(Debug, Deserialize)]
struct ComponentEntry {
    id: String,
    #[serde(default)]
    name: Option<String>,
    version: String,
    path: PathBuf,
}

/// Host description read from a JSON manifest
///
/// ```json
/// {
///   "platformVersion": "1.18.1",
///   "releaseTarget": "1.18.1",
///   "components": [
///     { "id": "sodium", "name": "Sodium", "version": "0.4.0", "path": "mods/sodium.jar" }
///   ]
/// }
/// ```
///
/// Relative component paths are resolved against the manifest's directory.
#[derive(Debug, Clone)]
pub struct ManifestHost {
    platform_version: String,
    release_target: String,
    components: Vec<InstalledComponent>,
}

impl ManifestHost {
    pub fn new(
        platform_version: &str,
        release_target: &str,
        components: Vec<InstalledComponent>,
    ) -> Self {
        Self {
            platform_version: platform_version.to_string(),
            release_target: release_target.to_string(),
            components,
        }
    }

    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let content = std::fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json(&content, base_dir)
    }

    pub fn from_json(content: &str, base_dir: &Path) -> Result<Self, StorageError> {
        let manifest: HostManifest = serde_json::from_str(content)?;

        let components = manifest
            .components
            .into_iter()
            .map(|entry| InstalledComponent {
                name: entry.name.unwrap_or_else(|| entry.id.clone()),
                version: DeclaredVersion::classify(&entry.version),
                path: base_dir.join(entry.path),
                id: entry.id,
            })
            .collect();

        let release_target = manifest
            .release_target
            .unwrap_or_else(|| manifest.platform_version.clone());

        Ok(Self {
            platform_version: manifest.platform_version,
            release_target,
            components,
        })
    }
}

impl HostPlatform for ManifestHost {
    fn installed_components(&self) -> Vec<InstalledComponent> {
        self.components.clone()
    }

    fn platform_version(&self) -> String {
        self.platform_version.clone()
    }

    fn release_target(&self) -> String {
        self.release_target.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("0.4.0", true)]
    #[case("1.18", true)]
    #[case("3.0.0+build.2", true)]
    #[case("${version}", false)]
    #[case("21w44a", false)]
    #[case("abc1234", false)]
    fn classify_detects_semantic_versions(#[case] raw: &str, #[case] semantic: bool) {
        assert_eq!(
            DeclaredVersion::classify(raw).as_semantic().is_some(),
            semantic
        );
    }

    #[test]
    fn opaque_version_displays_raw_string() {
        assert_eq!(DeclaredVersion::classify("abc1234").to_string(), "abc1234");
        assert_eq!(DeclaredVersion::classify("1.2").to_string(), "1.2.0");
    }

    #[test]
    fn from_json_resolves_paths_and_defaults() {
        let host = ManifestHost::from_json(
            r#"{
                "platformVersion": "1.18.1",
                "components": [
                    { "id": "sodium", "name": "Sodium", "version": "0.4.0", "path": "mods/sodium.jar" },
                    { "id": "weird", "version": "${version}", "path": "/abs/weird.jar" }
                ]
            }"#,
            Path::new("/game"),
        )
        .unwrap();

        assert_eq!(host.platform_version(), "1.18.1");
        assert_eq!(host.release_target(), "1.18.1");

        let components = host.installed_components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].path, PathBuf::from("/game/mods/sodium.jar"));
        assert_eq!(components[1].name, "weird");
        assert_eq!(components[1].path, PathBuf::from("/abs/weird.jar"));
        assert_eq!(
            components[1].version,
            DeclaredVersion::Opaque("${version}".to_string())
        );
    }

    #[test]
    fn component_finds_by_host_id() {
        let host = ManifestHost::from_json(
            r#"{
                "platformVersion": "1.18.1",
                "releaseTarget": "1.18",
                "components": [
                    { "id": "sodium", "version": "0.4.0", "path": "sodium.jar" }
                ]
            }"#,
            Path::new("."),
        )
        .unwrap();

        assert_eq!(host.release_target(), "1.18");
        assert!(host.component("sodium").is_some());
        assert!(host.component("lithium").is_none());
    }

    #[test]
    fn exists_checks_the_filesystem() {
        let temp_dir = TempDir::new().unwrap();
        let present = temp_dir.path().join("present.jar");
        std::fs::write(&present, b"jar").unwrap();

        let component = |path: PathBuf| InstalledComponent {
            id: "x".to_string(),
            name: "X".to_string(),
            version: DeclaredVersion::classify("1.0.0"),
            path,
        };

        assert!(component(present).exists());
        assert!(!component(temp_dir.path().join("missing.jar")).exists());
    }

    #[test]
    fn load_reports_malformed_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("host.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            ManifestHost::load(&path),
            Err(StorageError::Serialization(_))
        ));
    }
}

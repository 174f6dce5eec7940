//! Common types for catalog entries

use serde::{Deserialize, Serialize};

/// Release channel of a published version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    #[default]
    Release,
    Beta,
    Alpha,
}

impl VersionType {
    /// Returns the string representation of the release channel
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionType::Release => "release",
            VersionType::Beta => "beta",
            VersionType::Alpha => "alpha",
        }
    }
}

impl std::str::FromStr for VersionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "release" => Ok(VersionType::Release),
            "beta" => Ok(VersionType::Beta),
            "alpha" => Ok(VersionType::Alpha),
            _ => Err(()),
        }
    }
}

/// A mod as stored in the local catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mod {
    /// Catalog-unique identifier (e.g., "sodium")
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    /// Published artifacts, in no particular order
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

/// One published release of a [`Mod`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Raw version string as uploaded (may carry `+build` suffixes)
    pub version: String,
    /// Range of platform versions this artifact supports (e.g., ">=1.18 <1.19")
    ///
    /// `None` means compatibility is unknown.
    #[serde(default)]
    pub compatibility: Option<String>,
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub version_type: VersionType,
}

/// Search hit returned by a remote provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizedMod {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// A version entry returned by a remote provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModVersion {
    pub id: String,
    pub version: String,
    pub version_type: VersionType,
    /// Platform release targets this version declares support for
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ModVersion {
    /// Whether this version declares support for the given platform release target
    pub fn supports(&self, release_target: &str) -> bool {
        self.game_versions.iter().any(|v| v == release_target)
    }
}

//! Modrinth API implementation

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::warn;

use crate::catalog::error::CatalogError;
use crate::catalog::provider::ModProvider;
use crate::catalog::types::{ModVersion, SummarizedMod, VersionType};

/// Default base URL for the Modrinth API
pub const DEFAULT_BASE_URL: &str = "https://api.modrinth.com";

/// Response from the search endpoint
#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    project_id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    icon_url: Option<String>,
}

/// One entry of the project versions endpoint
#[derive(Debug, Deserialize)]
struct VersionResponse {
    id: String,
    version_number: String,
    version_type: VersionType,
    #[serde(default)]
    game_versions: Vec<String>,
    #[serde(default)]
    files: Vec<VersionFile>,
}

#[derive(Debug, Deserialize)]
struct VersionFile {
    url: String,
    #[serde(default)]
    primary: bool,
}

impl From<SearchHit> for SummarizedMod {
    fn from(hit: SearchHit) -> Self {
        Self {
            id: hit.project_id,
            name: hit.title,
            description: hit.description,
            author: hit.author,
            icon_url: hit.icon_url,
        }
    }
}

impl From<VersionResponse> for ModVersion {
    fn from(version: VersionResponse) -> Self {
        let download_url = version
            .files
            .iter()
            .find(|file| file.primary)
            .or_else(|| version.files.first())
            .map(|file| file.url.clone());

        Self {
            id: version.id,
            version: version.version_number,
            version_type: version.version_type,
            game_versions: version.game_versions,
            download_url,
        }
    }
}

/// Provider implementation for the Modrinth v2 API
pub struct ModrinthProvider {
    client: reqwest::Client,
    base_url: String,
}

impl ModrinthProvider {
    /// Creates a new ModrinthProvider with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("modkeeper/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, url: Url, id: &str) -> Result<reqwest::Response, CatalogError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id.to_string()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("x-ratelimit-reset")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok());
            return Err(CatalogError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            warn!("Modrinth returned status {}: {}", status, url);
            return Err(CatalogError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        Ok(response)
    }
}

impl Default for ModrinthProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl ModProvider for ModrinthProvider {
    fn name(&self) -> &'static str {
        "Modrinth"
    }

    async fn search(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SummarizedMod>, CatalogError> {
        let (offset, limit) = (offset.to_string(), limit.to_string());
        let url = Url::parse_with_params(
            &format!("{}/v2/search", self.base_url),
            &[
                ("query", query),
                ("offset", offset.as_str()),
                ("limit", limit.as_str()),
            ],
        )
        .map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;

        let response: SearchResponse = self.get(url, query).await?.json().await.map_err(|e| {
            warn!("Failed to parse Modrinth search response: {}", e);
            CatalogError::InvalidResponse(e.to_string())
        })?;

        Ok(response.hits.into_iter().map(SummarizedMod::from).collect())
    }

    async fn get_versions_for_mod(&self, id: &str) -> Result<Vec<ModVersion>, CatalogError> {
        let url = Url::parse(&format!("{}/v2/project/{}/version", self.base_url, id))
            .map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;

        let versions: Vec<VersionResponse> =
            self.get(url, id).await?.json().await.map_err(|e| {
                warn!("Failed to parse Modrinth versions response: {}", e);
                CatalogError::InvalidResponse(e.to_string())
            })?;

        Ok(versions.into_iter().map(ModVersion::from).collect())
    }
}

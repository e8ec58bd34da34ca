use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::models::{CategoryResponse, RawGuide, SearchResponse};

pub const DEFAULT_API_URL: &str = "https://www.ifixit.com/api/2.0";
pub const DEFAULT_IMAGE_URL: &str = "https://guide-images.cdn.ifixit.com/igi";

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct IfixitConfig {
    pub api_url: String,
    pub image_url: String,
    pub timeout: Duration,
}

impl Default for IfixitConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl IfixitConfig {
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IfixitError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("base url cannot take path segments: {0}")]
    OpaqueBaseUrl(String),

    #[error("upstream returned status {status} for {url}")]
    Status { status: StatusCode, url: String },
}

// ============================================================================
// Client
// ============================================================================

/// Thin GET-only client over the public iFixit API. No auth, no retries.
#[derive(Clone)]
pub struct IfixitClient {
    config: IfixitConfig,
    http: reqwest::Client,
}

impl IfixitClient {
    pub fn new(config: IfixitConfig) -> Result<Self, IfixitError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("fixit-agent/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    /// `GET /search/{query}?filter={filter}`
    pub async fn search(&self, query: &str, filter: &str) -> Result<SearchResponse, IfixitError> {
        let mut url = self.endpoint(&["search", query])?;
        url.query_pairs_mut().append_pair("filter", filter);
        self.get_json(url).await
    }

    /// `GET /wikis/CATEGORY/{slug}`
    pub async fn category(&self, slug: &str) -> Result<CategoryResponse, IfixitError> {
        let url = self.endpoint(&["wikis", "CATEGORY", slug])?;
        self.get_json(url).await
    }

    /// `GET /guides/{id}`
    pub async fn guide(&self, guide_id: u64) -> Result<RawGuide, IfixitError> {
        let url = self.endpoint(&["guides", &guide_id.to_string()])?;
        self.get_json(url).await
    }

    /// Canonical full-size image URL for an image identifier.
    pub fn image_url(&self, image_key: &str) -> String {
        format!("{}/{}.full", self.config.image_url, image_key)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, IfixitError> {
        let mut url = Url::parse(&self.config.api_url)?;
        url.path_segments_mut()
            .map_err(|_| IfixitError::OpaqueBaseUrl(self.config.api_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, IfixitError> {
        log::debug!("GET {}", url);
        let resp = self.http.get(url.clone()).send().await?;
        if !resp.status().is_success() {
            return Err(IfixitError::Status {
                status: resp.status(),
                url: url.to_string(),
            });
        }
        Ok(resp.json::<T>().await?)
    }
}

// ============================================================================
// Tests
// ============================================================================

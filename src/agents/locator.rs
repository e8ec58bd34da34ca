use std::sync::Arc;

use reqwest::StatusCode;
use url::Url;

use crate::agents::SearchQuery;
use crate::error::{ErrorContext, Result};
use crate::ifixit::{IfixitClient, IfixitError};
use crate::models::{DeviceCandidate, GuideCandidate, GuideSummary, SearchResult};

const DEVICE_FILTER: &str = "device";
const GUIDE_FILTER: &str = "guide";

/// Anything the locator can pick between by name.
pub trait Candidate {
    fn display_name(&self) -> &str;
}

impl Candidate for DeviceCandidate {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Candidate for GuideCandidate {
    fn display_name(&self) -> &str {
        &self.title
    }
}

/// First candidate whose name contains `query` (case-insensitive), else the
/// first candidate in upstream order.
pub fn select_candidate<'a, C: Candidate>(candidates: &'a [C], query: &str) -> Option<&'a C> {
    let needle = query.to_lowercase();
    candidates
        .iter()
        .find(|c| c.display_name().to_lowercase().contains(&needle))
        .or_else(|| candidates.first())
}

// ============================================================================
// GUIDE LOCATOR
// ============================================================================

pub struct GuideLocator {
    client: Arc<IfixitClient>,
}

impl GuideLocator {
    pub fn new(client: Arc<IfixitClient>) -> Self {
        Self { client }
    }

    pub async fn resolve(&self, query: &SearchQuery) -> Result<Option<(DeviceCandidate, GuideCandidate)>> {
        let Some(device) = self.find_device(query).await? else {
            return Ok(None);
        };
        let guide = self.find_guide(query, &device).await?;
        Ok(guide.map(|guide| (device, guide)))
    }

    pub async fn find_device(&self, query: &SearchQuery) -> Result<Option<DeviceCandidate>> {
        if query.is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .search(&query.phrase, DEVICE_FILTER)
            .await
            .context("device search")?;

        let devices: Vec<DeviceCandidate> = response
            .results
            .iter()
            .filter(|r| matches!(r.data_type.as_deref(), None | Some("wiki")))
            .filter_map(device_from_result)
            .collect();

        log::debug!("device search '{}' -> {} candidates", query.phrase, devices.len());
        Ok(select_candidate(&devices, &query.original).cloned())
    }

    /// Category guide listing first, then a guide search when the category
    /// has nothing to offer.
    pub async fn find_guide(
        &self,
        query: &SearchQuery,
        device: &DeviceCandidate,
    ) -> Result<Option<GuideCandidate>> {
        let listed = match self.client.category(&device.slug).await {
            Err(IfixitError::Status { status, .. }) if status == StatusCode::NOT_FOUND => Vec::new(),
            other => other.context("category guide listing")?.guides,
        };

        let mut guides: Vec<GuideCandidate> = listed.iter().filter_map(guide_from_summary).collect();

        if guides.is_empty() {
            log::debug!("category '{}' lists no guides, falling back to guide search", device.slug);
            let response = self
                .client
                .search(&query.phrase, GUIDE_FILTER)
                .await
                .context("guide search")?;
            guides = response
                .results
                .iter()
                .filter(|r| r.data_type.as_deref() == Some("guide"))
                .filter_map(guide_from_result)
                .collect();
        }

        Ok(select_candidate(&guides, &query.original).cloned())
    }
}

fn device_from_result(result: &SearchResult) -> Option<DeviceCandidate> {
    let name = result.name()?.to_string();
    let slug = result
        .url
        .as_deref()
        .and_then(slug_from_url)
        .unwrap_or_else(|| name.replace(' ', "_"));
    Some(DeviceCandidate {
        name,
        slug,
        url: result.url.clone(),
    })
}

fn slug_from_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let last = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    // Already-encoded segments would be encoded twice on the way out.
    if last.contains('%') {
        return None;
    }
    Some(last.to_string())
}

fn guide_from_summary(summary: &GuideSummary) -> Option<GuideCandidate> {
    let title = summary.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
    Some(GuideCandidate {
        id: summary.guideid?,
        title: title.to_string(),
        url: summary.url.clone(),
    })
}

fn guide_from_result(result: &SearchResult) -> Option<GuideCandidate> {
    Some(GuideCandidate {
        id: result.guideid?,
        title: result.name()?.to_string(),
        url: result.url.clone(),
    })
}

// ============================================================================
// TESTS
// ============================================================================

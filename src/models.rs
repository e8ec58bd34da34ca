use serde::{Deserialize, Serialize};

// ============================================================================
// Domain Models
// ============================================================================

/// A prospective match for the device named in the user's query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceCandidate {
    pub name: String,
    /// Category slug used for the guide listing lookup, e.g. `iPhone_12`.
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuideCandidate {
    pub id: u64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One normalized guide step, ready to be rendered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuideStep {
    pub title: String,
    pub instruction: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl GuideStep {
    /// Markdown rendering: heading, instruction text, then image embeds.
    pub fn render(&self, index: usize) -> String {
        let mut out = format!("### Step {}: {}\n{}\n", index, self.title, self.instruction);
        for image in &self.images {
            out.push_str(&format!("![image]({})\n", image));
        }
        out
    }
}

// ============================================================================
// iFixit API payloads
// ============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SearchResult {
    pub title: Option<String>,
    pub display_title: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "dataType")]
    pub data_type: Option<String>,
    pub guideid: Option<u64>,
}

impl SearchResult {
    pub fn name(&self) -> Option<&str> {
        self.display_title
            .as_deref()
            .or(self.title.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// `wikis/CATEGORY/{slug}` payload; only the guide listing is consumed.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CategoryResponse {
    pub title: Option<String>,
    #[serde(default)]
    pub guides: Vec<GuideSummary>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GuideSummary {
    pub guideid: Option<u64>,
    pub title: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawGuide {
    pub guideid: Option<u64>,
    pub title: Option<String>,
    pub steps: Option<Vec<RawStep>>,
}

// Step records come in several shapes. Every nesting level is optional.

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStep {
    pub title: Option<String>,
    pub lines: Option<Vec<RawLine>>,
    pub tasks: Option<Vec<RawTask>>,
    pub summary: Option<String>,
    pub media: Option<RawMedia>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLine {
    pub text_raw: Option<String>,
    pub text: Option<String>,
    pub media: Option<RawMedia>,
}

impl RawLine {
    pub fn text(&self) -> Option<&str> {
        self.text_raw.as_deref().or(self.text.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawTask {
    pub title: Option<String>,
    pub body: Option<String>,
    pub lines: Option<Vec<RawLine>>,
    pub media: Option<RawMedia>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawMedia {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub data: Option<MediaData>,
}

/// Image media carries a list; video and embed media carry a single object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MediaData {
    Items(Vec<MediaItem>),
    Other(serde_json::Value),
}

/// One entry of a media list. Entries that do not look like an image are
/// kept aside so they cannot take their neighbours down with them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MediaItem {
    Image(RawImage),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawImage {
    pub id: Option<u64>,
    pub guid: Option<String>,
    pub original: Option<String>,
}

impl RawMedia {
    pub fn images(&self) -> impl Iterator<Item = &RawImage> {
        let items = match &self.data {
            Some(MediaData::Items(items)) => items.as_slice(),
            _ => &[],
        };
        items.iter().filter_map(|item| match item {
            MediaItem::Image(image) => Some(image),
            MediaItem::Other(_) => None,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

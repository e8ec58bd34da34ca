use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{ErrorContext, Result};
use crate::ifixit::IfixitClient;
use crate::models::{GuideStep, RawImage, RawLine, RawMedia, RawStep};

pub const FALLBACK_INSTRUCTION: &str = "Follow the images carefully for this step.";

pub struct StepNormalizer {
    client: Arc<IfixitClient>,
}

impl StepNormalizer {
    pub fn new(client: Arc<IfixitClient>) -> Self {
        Self { client }
    }

    pub async fn fetch_steps(&self, guide_id: u64) -> Result<Vec<GuideStep>> {
        let guide = self
            .client
            .guide(guide_id)
            .await
            .context(format!("guide {} lookup", guide_id))?;

        let raw_steps = guide.steps.unwrap_or_default();
        log::debug!("guide {} has {} raw steps", guide_id, raw_steps.len());

        Ok(normalize_steps(&raw_steps, |key| self.client.image_url(key)))
    }
}

pub fn normalize_steps(raw_steps: &[RawStep], image_url: impl Fn(&str) -> String) -> Vec<GuideStep> {
    raw_steps
        .iter()
        .enumerate()
        .map(|(i, raw)| normalize_step(raw, i + 1, &image_url))
        .collect()
}

/// Flatten one upstream step. `number` is 1-based and only used to label
/// steps that come without a title.
pub fn normalize_step(raw: &RawStep, number: usize, image_url: impl Fn(&str) -> String) -> GuideStep {
    let title = non_blank(raw.title.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Step {}", number));

    GuideStep {
        title,
        instruction: instruction_text(raw),
        images: collect_images(raw, image_url),
    }
}

fn instruction_text(raw: &RawStep) -> String {
    let mut fragments: Vec<&str> = Vec::new();

    fragments.extend(line_texts(raw.lines.as_deref()));
    for task in raw.tasks.iter().flatten() {
        fragments.extend(non_blank(task.title.as_deref()));
        fragments.extend(non_blank(task.body.as_deref()));
        fragments.extend(line_texts(task.lines.as_deref()));
    }

    let text = fragments.join("\n").trim().to_string();
    if !text.is_empty() {
        return text;
    }

    non_blank(raw.summary.as_deref())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| FALLBACK_INSTRUCTION.to_string())
}

fn line_texts(lines: Option<&[RawLine]>) -> impl Iterator<Item = &str> {
    lines.into_iter().flatten().filter_map(|line| non_blank(line.text()))
}

fn collect_images(raw: &RawStep, image_url: impl Fn(&str) -> String) -> Vec<String> {
    let mut media: Vec<&RawMedia> = Vec::new();

    media.extend(raw.media.as_ref());
    media.extend(raw.lines.iter().flatten().filter_map(|l| l.media.as_ref()));
    for task in raw.tasks.iter().flatten() {
        media.extend(task.media.as_ref());
        media.extend(task.lines.iter().flatten().filter_map(|l| l.media.as_ref()));
    }

    let mut seen = HashSet::new();
    media
        .into_iter()
        .flat_map(RawMedia::images)
        .filter_map(|image| canonical_image_url(image, &image_url))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

fn canonical_image_url(image: &RawImage, image_url: impl Fn(&str) -> String) -> Option<String> {
    if let Some(guid) = non_blank(image.guid.as_deref()) {
        return Some(image_url(guid));
    }
    if let Some(id) = image.id {
        return Some(image_url(&id.to_string()));
    }
    non_blank(image.original.as_deref()).map(str::to_string)
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

// ============================================================================
// TESTS
// ============================================================================

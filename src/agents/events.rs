use crate::models::{DeviceCandidate, GuideCandidate, GuideStep};

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressChunk {
    // Lifecycle events
    Interpreting {
        phrase: String,
    },

    // Locator events
    DeviceFound {
        device: DeviceCandidate,
    },

    GuideLoading {
        guide: GuideCandidate,
    },

    // Content events
    Step {
        index: usize,
        step: GuideStep,
    },

    // Terminal events
    Completed {
        steps: usize,
    },

    NotFound {
        phrase: String,
    },

    NoSteps {
        guide: GuideCandidate,
    },

    Failed {
        error: String,
    },
}

impl ProgressChunk {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::NotFound { .. } | Self::NoSteps { .. } | Self::Failed { .. }
        )
    }

    /// Markdown text sent to the caller. Carriage returns are dropped since
    /// an SSE data line cannot carry them.
    pub fn text(&self) -> String {
        let text = match self {
            Self::Interpreting { phrase } if phrase.is_empty() => {
                "🔍 Searching iFixit for your device...\n".to_string()
            }
            Self::Interpreting { phrase } => {
                format!("🔍 Searching iFixit for \"{}\"...\n", phrase)
            }
            Self::DeviceFound { device } => format!("📱 Found device: **{}**\n", device.name),
            Self::GuideLoading { guide } => match &guide.url {
                Some(url) => format!("📘 Loading guide: **{}**\n{}\n", guide.title, url),
                None => format!("📘 Loading guide: **{}**\n", guide.title),
            },
            Self::Step { index, step } => step.render(*index),
            Self::Completed { .. } => "✅ Repair guide completed!\n".to_string(),
            Self::NotFound { phrase } if phrase.is_empty() => {
                "❌ No repair guides found. Try naming your device, e.g. \"iPhone 12 screen\".\n"
                    .to_string()
            }
            Self::NotFound { phrase } => {
                format!("❌ No repair guides found for \"{}\".\n", phrase)
            }
            Self::NoSteps { guide } => {
                format!("⚠️ The guide \"{}\" has no steps to show.\n", guide.title)
            }
            Self::Failed { error } => {
                format!("⚠️ Could not load the repair guide from iFixit: {}\n", error)
            }
        };
        text.replace('\r', "")
    }
}

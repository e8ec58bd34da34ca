/// Number of leading tokens kept as the device search phrase.
const PHRASE_TOKENS: usize = 2;

/// User input split into the text used for candidate matching and the
/// coarse phrase sent to the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub original: String,
    pub phrase: String,
}

impl SearchQuery {
    pub fn new(raw: &str) -> Self {
        Self {
            original: raw.trim().to_string(),
            phrase: interpret(raw),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.phrase.is_empty()
    }
}

/// First two whitespace-separated tokens, joined by a single space.
pub fn interpret(raw: &str) -> String {
    raw.split_whitespace()
        .take(PHRASE_TOKENS)
        .collect::<Vec<_>>()
        .join(" ")
}

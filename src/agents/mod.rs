// Public module exports
pub mod events;
pub mod query;
pub mod locator;
pub mod normalizer;
pub mod repair_agent;

// Re-export main types for convenience
pub use events::ProgressChunk;
pub use query::{interpret, SearchQuery};
pub use locator::{select_candidate, Candidate, GuideLocator};
pub use normalizer::{normalize_step, normalize_steps, StepNormalizer, FALLBACK_INSTRUCTION};
pub use repair_agent::{Cancelled, RepairAgent};

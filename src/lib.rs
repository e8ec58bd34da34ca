pub mod agents;
pub mod error;
pub mod handlers;
pub mod ifixit;
pub mod init;
pub mod models;

pub use crate::agents::{ProgressChunk, RepairAgent, SearchQuery};
pub use crate::init::{AppState, Config};

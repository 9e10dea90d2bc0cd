//! Transcript model and the normalized wire protocol shared by the
//! transcoder and the widget.

pub mod intent;
mod models;
mod prompt;
mod wire;

pub use intent::is_pricing_query;
pub use models::{ChatTurn, Role};
pub use prompt::BASE_SYSTEM_PROMPT;
pub use wire::{ChunkChoice, ChunkDelta, CompletionChunk, DONE_SENTINEL};

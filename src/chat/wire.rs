//! Normalized event framing between the transcoder and the widget.
//!
//! The server re-frames whatever the upstream provider sends into these
//! shapes, so swapping the provider only ever touches the transcoder:
//!
//! - content line: `data: {"choices":[{"delta":{"content":"<fragment>"}}]}`
//! - termination line: `data: [DONE]`

use serde::{Deserialize, Serialize};

/// Terminates the normalized stream
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct CompletionChunk {
    pub choices: Vec<ChunkChoice>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChunkChoice {
    pub delta: ChunkDelta,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChunkDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl CompletionChunk {
    /// A chunk carrying one incremental text fragment
    pub fn content(text: &str) -> Self {
        CompletionChunk {
            choices: vec![ChunkChoice {
                delta: ChunkDelta {
                    content: Some(text.to_string()),
                },
            }],
        }
    }

    /// The first choice's delta content, if any
    pub fn delta_content(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.delta.content.as_deref())
    }

    /// Wire encoding of this chunk
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("wire chunk serialization is infallible")
    }
}

//! Public types for the chat API
use serde::Deserialize;

use crate::chat::ChatTurn;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatTurn>,
}

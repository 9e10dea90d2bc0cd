//! Public types for the knowledge base API
use serde::{Deserialize, Serialize};

use crate::knowledge::KnowledgeMatch;

#[derive(Deserialize)]
pub struct StoreSnippetRequest {
    pub content: String,
}

#[derive(Serialize)]
pub struct StoreSnippetResponse {
    pub id: i64,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<KnowledgeMatch>,
}

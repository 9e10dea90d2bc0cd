//! Retrieval over the vector-indexed knowledge base.
//!
//! Similarity search is delegated entirely to sqlite-vec's built-in KNN;
//! this module only embeds queries, stores snippets, and renders matches
//! into a context block for the system prompt.

pub mod db;
pub mod embedding;

pub use db::{EMBEDDING_DIM, KnowledgeMatch, delete_snippet, insert_snippet, match_snippets};
pub use embedding::generate_embedding;

use tokio_rusqlite::Connection;

use crate::core::AppConfig;

/// Minimum similarity for a snippet to be considered relevant
pub const MATCH_THRESHOLD: f32 = 0.5;
/// Number of snippets appended to the system prompt
pub const MATCH_COUNT: usize = 3;

/// Builds the context block appended to the system prompt for `query`.
///
/// Every failure path (no embedding key, embedding call failed, store
/// error, zero matches) degrades to `None` so the chat flow proceeds with
/// the unaugmented prompt. Errors are logged, never surfaced.
pub async fn search_relevant_content(
    db: &Connection,
    config: &AppConfig,
    query: &str,
) -> Option<String> {
    if config.openai_api_key.is_empty() {
        return None;
    }

    let embedding = match generate_embedding(
        &config.openai_api_hostname,
        &config.openai_api_key,
        &config.embedding_model,
        query,
    )
    .await
    {
        Ok(embedding) => embedding,
        Err(err) => {
            tracing::warn!("Embedding request failed: {}", err);
            return None;
        }
    };

    let matches = match match_snippets(db, &embedding, MATCH_THRESHOLD, MATCH_COUNT).await {
        Ok(matches) => matches,
        Err(err) => {
            tracing::warn!("Knowledge search failed: {}", err);
            return None;
        }
    };

    if matches.is_empty() {
        return None;
    }

    tracing::debug!("Found {} relevant documents", matches.len());

    let context = matches
        .iter()
        .map(|doc| format!("[Relevance: {:.0}%]\n{}", doc.similarity * 100.0, doc.content))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    Some(format!(
        "\n\n=== ADDITIONAL CONTEXT FROM KNOWLEDGE BASE ===\nThe following information may be relevant to the user's question:\n\n{}",
        context
    ))
}

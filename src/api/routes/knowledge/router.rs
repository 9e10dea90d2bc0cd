//! Router for the knowledge base API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::core::AppConfig;
use crate::knowledge::{
    MATCH_THRESHOLD, delete_snippet, generate_embedding, insert_snippet, match_snippets,
};

type SharedState = Arc<RwLock<AppState>>;

/// Search returns a few more hits than chat enrichment does
const SEARCH_MATCH_COUNT: usize = 5;

fn state_parts(state: &SharedState) -> (tokio_rusqlite::Connection, AppConfig) {
    let shared_state = state.read().expect("Unable to read shared state");
    (shared_state.db.clone(), shared_state.config.clone())
}

fn require_embedding_key(config: &AppConfig) -> Result<(), ApiError> {
    if config.openai_api_key.is_empty() {
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "OPENAI_API_KEY is not configured",
        ));
    }
    Ok(())
}

/// Embed and store one snippet
async fn store_snippet(
    State(state): State<SharedState>,
    axum::Json(payload): axum::Json<public::StoreSnippetRequest>,
) -> Result<axum::Json<public::StoreSnippetResponse>, ApiError> {
    let (db, config) = state_parts(&state);
    require_embedding_key(&config)?;

    let embedding = generate_embedding(
        &config.openai_api_hostname,
        &config.openai_api_key,
        &config.embedding_model,
        &payload.content,
    )
    .await?;
    let id = insert_snippet(&db, &payload.content, embedding).await?;

    tracing::debug!("Stored snippet {}", id);

    Ok(axum::Json(public::StoreSnippetResponse { id }))
}

/// Embed the query and return ranked matches
async fn search(
    State(state): State<SharedState>,
    Query(params): Query<public::SearchQuery>,
) -> Result<axum::Json<public::SearchResponse>, ApiError> {
    let (db, config) = state_parts(&state);
    require_embedding_key(&config)?;

    let embedding = generate_embedding(
        &config.openai_api_hostname,
        &config.openai_api_key,
        &config.embedding_model,
        &params.q,
    )
    .await?;
    let results = match_snippets(&db, &embedding, MATCH_THRESHOLD, SEARCH_MATCH_COUNT).await?;

    Ok(axum::Json(public::SearchResponse { results }))
}

/// Remove a snippet by id
async fn remove_snippet(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let (db, _) = state_parts(&state);

    if delete_snippet(&db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

/// Create the knowledge router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(store_snippet))
        .route("/search", get(search))
        .route("/{id}", delete(remove_snippet))
}

//! Router for the chat transcoder API

use std::convert::Infallible;
use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, sse::Event, sse::KeepAlive, sse::Sse},
    routing::post,
};
use futures_util::StreamExt;

use super::public;
use crate::anthropic::{UpstreamFailure, stream_messages};
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::chat::Role;
use crate::knowledge::search_relevant_content;

type SharedState = Arc<RwLock<AppState>>;

/// Stream the next assistant turn for the submitted transcript
async fn chat_handler(
    State(state): State<SharedState>,
    axum::Json(payload): axum::Json<public::ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (db, config) = {
        let shared_state = state.read().expect("Unable to read shared state");
        (shared_state.db.clone(), shared_state.config.clone())
    };

    if config.anthropic_api_key.is_empty() {
        tracing::error!("ANTHROPIC_API_KEY is not configured");
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "ANTHROPIC_API_KEY is not configured",
        ));
    }

    // Ground the reply in the knowledge base when possible. Enrichment
    // failures degrade to the base prompt.
    let mut system_prompt = config.system_prompt.clone();
    let last_user_turn = payload.messages.iter().rev().find(|m| m.role == Role::User);
    if let Some(turn) = last_user_turn
        && let Some(context) = search_relevant_content(&db, &config, &turn.content).await
    {
        system_prompt.push_str(&context);
    }

    tracing::debug!(
        "Sending request to the Messages API with {} turns",
        payload.messages.len()
    );

    let stream = stream_messages(
        &config.anthropic_api_hostname,
        &config.anthropic_api_key,
        &config.anthropic_model,
        &system_prompt,
        &payload.messages,
    )
    .await
    .map_err(|err| match err.downcast_ref::<UpstreamFailure>() {
        Some(failure) if failure.is_rate_limited() => ApiError::rate_limited(),
        Some(failure) => {
            tracing::error!("Messages API error: {} {}", failure.status, failure.body);
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "AI service error")
        }
        None => err.into(),
    })?;

    let sse_stream = stream.map(|chunk| Ok::<Event, Infallible>(Event::default().data(chunk)));

    let resp = Sse::new(sse_stream)
        .keep_alive(KeepAlive::default().text("keep-alive"))
        .into_response();

    Ok(resp)
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(chat_handler))
}

//! API routes module

pub mod chat;
pub mod knowledge;

use std::sync::{Arc, RwLock};

use axum::Router;

use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Chat transcoder routes
        .nest("/chat", chat::router())
        // Knowledge base routes
        .nest("/knowledge", knowledge::router())
}

//! Test utilities for integration tests
use std::sync::{Arc, RwLock};

use axum::Router;
use axum::body::Body;
use tempfile::TempDir;

use concierge::api::AppState;
use concierge::api::app;
use concierge::core::AppConfig;
use concierge::core::db::{async_db, initialize_db};

/// Base test config. The API hostnames point at nothing; tests that
/// exercise an upstream override them with a mock server URL.
pub fn test_config() -> AppConfig {
    AppConfig {
        knowledge_db_path: String::new(),
        anthropic_api_hostname: String::from("http://127.0.0.1:9"),
        anthropic_api_key: String::from("test-api-key"),
        anthropic_model: String::from("claude-sonnet-4-20250514"),
        openai_api_hostname: String::from("http://127.0.0.1:9"),
        openai_api_key: String::new(),
        embedding_model: String::from("text-embedding-3-small"),
        system_prompt: String::from("You are a helpful assistant."),
    }
}

/// Creates a test application router backed by a temporary database.
///
/// The returned `TempDir` owns the database files; keep it alive for the
/// duration of the test.
pub async fn test_app(mut config: AppConfig) -> (Router, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    config.knowledge_db_path = dir.path().display().to_string();

    let db = async_db(&config.knowledge_db_path)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to migrate db");
        Ok(())
    })
    .await
    .unwrap();

    let app_state = AppState::new(db, config);
    (app(Arc::new(RwLock::new(app_state))), dir)
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}

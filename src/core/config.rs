use std::env;

use crate::chat::BASE_SYSTEM_PROMPT;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub knowledge_db_path: String,
    pub anthropic_api_hostname: String,
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub embedding_model: String,
    pub system_prompt: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("CONCIERGE_STORAGE_PATH").unwrap_or("./".to_string());
        let knowledge_db_path = format!("{}/db", storage_path);
        let anthropic_api_hostname = env::var("CONCIERGE_ANTHROPIC_HOST")
            .unwrap_or_else(|_| "https://api.anthropic.com".to_string());
        // A missing key is checked per request so the server can still boot
        // and serve the knowledge routes without it
        let anthropic_api_key = env::var("ANTHROPIC_API_KEY").unwrap_or_default();
        let anthropic_model = env::var("CONCIERGE_ANTHROPIC_MODEL")
            .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string());
        let openai_api_hostname = env::var("CONCIERGE_OPENAI_HOST")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let openai_api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        let embedding_model = env::var("CONCIERGE_EMBEDDING_MODEL")
            .unwrap_or_else(|_| "text-embedding-3-small".to_string());
        let system_prompt =
            env::var("CONCIERGE_SYSTEM_PROMPT").unwrap_or_else(|_| BASE_SYSTEM_PROMPT.to_string());

        Self {
            knowledge_db_path,
            anthropic_api_hostname,
            anthropic_api_key,
            anthropic_model,
            openai_api_hostname,
            openai_api_key,
            embedding_model,
            system_prompt,
        }
    }
}

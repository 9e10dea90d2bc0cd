//! Embedding generation via the OpenAI embeddings API.

use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embed `input` into a fixed-length vector
pub async fn generate_embedding(
    api_hostname: &str,
    api_key: &str,
    model: &str,
    input: &str,
) -> Result<Vec<f32>> {
    let url = format!("{}/v1/embeddings", api_hostname.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(30))
        .json(&json!({
            "model": model,
            "input": input,
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        bail!("Embeddings API returned {}", response.status());
    }

    let body: EmbeddingResponse = response.json().await?;
    body.data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| anyhow!("Embeddings API response missing data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_embedding() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/embeddings")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"embedding":[0.1,0.2,0.3]}]}"#)
            .create_async()
            .await;

        let embedding = generate_embedding(
            &server.url(),
            "test-key",
            "text-embedding-3-small",
            "hello",
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_generate_embedding_api_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/embeddings")
            .with_status(500)
            .create_async()
            .await;

        let result = generate_embedding(
            &server.url(),
            "test-key",
            "text-embedding-3-small",
            "hello",
        )
        .await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_generate_embedding_empty_data() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        let result = generate_embedding(
            &server.url(),
            "test-key",
            "text-embedding-3-small",
            "hello",
        )
        .await;

        assert!(result.is_err());
    }
}

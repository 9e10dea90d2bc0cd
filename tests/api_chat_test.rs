//! Integration tests for the chat transcoder endpoint

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serial_test::serial;
    use tower::util::ServiceExt;

    use crate::test_utils::{body_to_string, test_app, test_config};

    const ANTHROPIC_SSE_BODY: &str = "event: message_start\n\
        data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n\
        \n\
        event: content_block_delta\n\
        data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"We offer\"}}\n\
        \n\
        event: content_block_delta\n\
        data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\" dashboards\"}}\n\
        \n\
        event: message_stop\n\
        data: {\"type\":\"message_stop\"}\n\
        \n";

    fn chat_request(message: &str) -> Request<Body> {
        Request::builder()
            .uri("/api/chat")
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "messages": [{ "role": "user", "content": message }]
                })
                .to_string(),
            ))
            .unwrap()
    }

    /// A missing upstream credential fails before any stream bytes
    #[tokio::test]
    #[serial]
    async fn it_fails_fast_without_upstream_credentials() {
        let mut config = test_config();
        config.anthropic_api_key = String::new();
        let (app, _dir) = test_app(config).await;

        let response = app
            .oneshot(chat_request("Tell me about Power BI"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_to_string(response.into_body()).await;
        assert!(body.contains("\"error\""));
        assert!(body.contains("not configured"));
    }

    /// Missing required field should return 422 (validation error)
    #[tokio::test]
    #[serial]
    async fn it_rejects_malformed_request_bodies() {
        let (app, _dir) = test_app(test_config()).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/chat")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"history":[]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    /// Upstream 429 keeps its status and gets a distinct message
    #[tokio::test]
    #[serial]
    async fn it_maps_upstream_rate_limiting_to_429() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .with_status(429)
            .with_body("overloaded")
            .create_async()
            .await;

        let mut config = test_config();
        config.anthropic_api_hostname = server.url();
        let (app, _dir) = test_app(config).await;

        let response = app.oneshot(chat_request("Hello")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let body = body_to_string(response.into_body()).await;
        assert!(body.contains("Rate limit exceeded"));
    }

    /// Any other upstream failure becomes a generic 500
    #[tokio::test]
    #[serial]
    async fn it_maps_other_upstream_failures_to_500() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;

        let mut config = test_config();
        config.anthropic_api_hostname = server.url();
        let (app, _dir) = test_app(config).await;

        let response = app.oneshot(chat_request("Hello")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_to_string(response.into_body()).await;
        assert!(body.contains("AI service error"));
    }

    /// The vendor stream is re-framed into the normalized wire format
    #[tokio::test]
    #[serial]
    async fn it_transcodes_the_upstream_stream() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-api-key")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(ANTHROPIC_SSE_BODY)
            .create_async()
            .await;

        let mut config = test_config();
        config.anthropic_api_hostname = server.url();
        let (app, _dir) = test_app(config).await;

        let response = app.oneshot(chat_request("What do you offer?")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_to_string(response.into_body()).await;
        let content_lines: Vec<&str> = body
            .lines()
            .filter(|l| l.starts_with("data: {"))
            .collect();
        assert_eq!(
            content_lines,
            vec![
                r#"data: {"choices":[{"delta":{"content":"We offer"}}]}"#,
                r#"data: {"choices":[{"delta":{"content":" dashboards"}}]}"#,
            ]
        );
        assert!(body.contains("data: [DONE]"));
        // Nothing follows the termination sentinel
        assert!(body.trim_end().ends_with("data: [DONE]"));
    }

    /// Enrichment finding nothing leaves the flow intact
    #[tokio::test]
    #[serial]
    async fn it_succeeds_when_enrichment_finds_nothing() {
        let mut server = mockito::Server::new_async().await;

        let mut embedding = vec![0.0_f32; 1536];
        embedding[0] = 1.0;
        let embeddings_mock = server
            .mock("POST", "/v1/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!({ "data": [{ "embedding": embedding }] }).to_string())
            .create_async()
            .await;
        let messages_mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(ANTHROPIC_SSE_BODY)
            .create_async()
            .await;

        let mut config = test_config();
        config.anthropic_api_hostname = server.url();
        config.openai_api_hostname = server.url();
        config.openai_api_key = String::from("test-embedding-key");
        let (app, _dir) = test_app(config).await;

        // The knowledge store is empty so the search finds nothing
        let response = app.oneshot(chat_request("What do you offer?")).await.unwrap();

        embeddings_mock.assert_async().await;
        messages_mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_to_string(response.into_body()).await;
        assert!(body.contains(r#"data: {"choices":[{"delta":{"content":"We offer"}}]}"#));
        assert!(body.contains("data: [DONE]"));
    }
}

//! Streaming client for the Anthropic Messages API.
//!
//! Calls `/v1/messages` with `stream: true` and re-frames the vendor's SSE
//! events into the normalized wire protocol in [`crate::chat`]. The widget
//! never sees the vendor schema, so a provider swap only touches this
//! module.

use std::fmt;
use std::time::Duration;

use anyhow::Result;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt, pin_mut};
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::chat::{ChatTurn, CompletionChunk, DONE_SENTINEL};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Streaming events from the Messages API
#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
pub enum StreamEvent {
    /// Start of a new message
    #[serde(rename = "message_start")]
    MessageStart,

    /// Start of a content block
    #[serde(rename = "content_block_start")]
    ContentBlockStart,

    /// Incremental update to a content block
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { delta: Delta },

    /// End of a content block
    #[serde(rename = "content_block_stop")]
    ContentBlockStop,

    /// Message-level updates (stop reason, usage)
    #[serde(rename = "message_delta")]
    MessageDelta,

    /// End of the message
    #[serde(rename = "message_stop")]
    MessageStop,

    /// Periodic keep-alive from the API
    #[serde(rename = "ping")]
    Ping,
}

/// Delta updates for content blocks. Only text deltas are modeled; a
/// delta of any other kind fails to parse and its line is dropped.
#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
pub enum Delta {
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
}

/// Upstream call failed before any stream bytes arrived
#[derive(Debug)]
pub struct UpstreamFailure {
    pub status: StatusCode,
    pub body: String,
}

impl UpstreamFailure {
    pub fn is_rate_limited(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS
    }
}

impl fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Messages API returned {}: {}", self.status, self.body)
    }
}

impl std::error::Error for UpstreamFailure {}

/// Requests the next assistant turn for `transcript` and returns the
/// re-framed stream of normalized wire payloads.
///
/// Fails with [`UpstreamFailure`] on a non-success status before any
/// stream bytes are produced; once the stream has started, upstream
/// errors end it silently.
pub async fn stream_messages(
    api_hostname: &str,
    api_key: &str,
    model: &str,
    system: &str,
    transcript: &[ChatTurn],
) -> Result<BoxStream<'static, String>> {
    let payload = json!({
        "model": model,
        "max_tokens": MAX_TOKENS,
        "system": system,
        "messages": transcript,
        "stream": true,
    });
    let url = format!("{}/v1/messages", api_hostname.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(url)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(60 * 5))
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamFailure { status, body }.into());
    }

    Ok(Box::pin(transcode_stream(response.bytes_stream())))
}

/// Re-frames an upstream SSE byte stream into normalized wire payloads.
///
/// The bytes are buffered and split on newline boundaries so that lines
/// fragmented across network reads are reassembled before parsing. Blank
/// lines, `:` comments, and non-`data: ` lines are ignored. Each text
/// delta maps to one normalized content payload; `message_stop` or a
/// literal `[DONE]` maps to a single termination sentinel after which the
/// stream ends. A line with malformed JSON is dropped without aborting
/// the stream.
pub fn transcode_stream<S, B, E>(upstream: S) -> impl Stream<Item = String>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    async_stream::stream! {
        pin_mut!(upstream);
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = upstream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    // No error signaling is possible mid-stream; it just ends
                    tracing::warn!("Upstream stream ended early: {}", err);
                    return;
                }
            };
            buffer.extend_from_slice(chunk.as_ref());

            // Process every complete line in the buffer, keeping the
            // remainder for the next read
            while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                let raw: Vec<u8> = buffer.drain(..=newline).collect();
                let mut line = &raw[..raw.len() - 1];
                if let Some(stripped) = line.strip_suffix(b"\r") {
                    line = stripped;
                }
                let Ok(line) = std::str::from_utf8(line) else {
                    continue;
                };
                if line.is_empty() || line.starts_with(':') {
                    continue;
                }
                let Some(payload) = line.strip_prefix("data: ") else {
                    continue;
                };
                let payload = payload.trim();
                if payload.is_empty() {
                    continue;
                }
                if payload == DONE_SENTINEL {
                    yield DONE_SENTINEL.to_string();
                    return;
                }
                match serde_json::from_str::<StreamEvent>(payload) {
                    Ok(StreamEvent::ContentBlockDelta {
                        delta: Delta::TextDelta { text },
                    }) if !text.is_empty() => {
                        yield CompletionChunk::content(&text).encode();
                    }
                    Ok(StreamEvent::MessageStop) => {
                        yield DONE_SENTINEL.to_string();
                        return;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::trace!("Dropping malformed upstream line: {} - {}", err, line);
                    }
                }
            }
        }
    }
}

//! Incremental consumption of the normalized event stream.

use anyhow::{Result, bail};
use futures_util::{StreamExt, pin_mut};
use serde_json::json;

use crate::chat::{ChatTurn, CompletionChunk, DONE_SENTINEL};

/// Reassembles normalized `data: ` lines from arbitrarily fragmented
/// network reads and accumulates the growing assistant message.
///
/// Bytes are buffered until a terminating newline arrives, so a line
/// split across reads is never processed early and a multi-byte
/// character split across reads is never corrupted. Feeding the same
/// bytes in one chunk or N chunks yields the same final message.
#[derive(Default)]
pub struct DeltaAccumulator {
    buffer: Vec<u8>,
    message: String,
    last_failed_line: Option<Vec<u8>>,
    done: bool,
}

impl DeltaAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The assistant message accumulated so far
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True once the termination sentinel has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one network read. Returns true when the visible message grew.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> bool {
        self.buffer.extend_from_slice(chunk);
        let mut changed = false;

        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline).collect();
            let mut line = &raw[..raw.len() - 1];
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }
            let Ok(line_str) = std::str::from_utf8(line) else {
                continue;
            };
            if line_str.trim().is_empty() || line_str.starts_with(':') {
                continue;
            }
            let Some(payload) = line_str.strip_prefix("data: ") else {
                continue;
            };
            let payload = payload.trim();
            if payload == DONE_SENTINEL {
                self.done = true;
                break;
            }
            match serde_json::from_str::<CompletionChunk>(payload) {
                Ok(chunk) => {
                    self.last_failed_line = None;
                    if let Some(content) = chunk.delta_content()
                        && !content.is_empty()
                    {
                        self.message.push_str(content);
                        changed = true;
                    }
                }
                Err(_) => {
                    if self.last_failed_line.as_deref() == Some(line) {
                        // Already retried once with more bytes; drop it
                        self.last_failed_line = None;
                        continue;
                    }
                    // The line may be a fragment the next read completes.
                    // Put it back, newline included, and stop processing
                    // this chunk.
                    self.last_failed_line = Some(line.to_vec());
                    let mut restored = raw;
                    restored.extend_from_slice(&self.buffer);
                    self.buffer = restored;
                    break;
                }
            }
        }

        changed
    }
}

/// POST the transcript and drive the incremental read loop, invoking
/// `on_update` with the accumulated assistant text each time it grows.
/// Resolves with the final text when the stream ends. Rejects on
/// transport failure before any visible text has arrived; after that a
/// failure only truncates the message.
pub async fn stream_chat<F>(
    http: &reqwest::Client,
    chat_url: &str,
    bearer_token: &str,
    transcript: &[ChatTurn],
    mut on_update: F,
) -> Result<String>
where
    F: FnMut(&str),
{
    let response = http
        .post(chat_url)
        .bearer_auth(bearer_token)
        .header("Content-Type", "application/json")
        .json(&json!({ "messages": transcript }))
        .send()
        .await?;

    if !response.status().is_success() {
        bail!("Failed to start stream: {}", response.status());
    }

    let stream = response.bytes_stream();
    pin_mut!(stream);
    let mut accumulator = DeltaAccumulator::new();

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => {
                if accumulator.push_chunk(&bytes) {
                    on_update(accumulator.message());
                }
            }
            Err(err) if accumulator.message().is_empty() => return Err(err.into()),
            Err(err) => {
                tracing::warn!("Stream ended early: {}", err);
                break;
            }
        }
    }

    Ok(accumulator.message().to_string())
}

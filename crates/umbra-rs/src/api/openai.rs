//! OpenAI-style chat completions client.
//!
//! Implements [`ChatClient`] over the `/chat/completions` wire shape in
//! both one-shot and SSE streaming modes. Only the fields the
//! summarization core needs are modeled; the rest of the vendor surface
//! is out of scope.

use crate::api::streaming::{SseFrame, SseParser};
use crate::api::{ChatClient, ChatMessage, ChatRequest, DeltaStream, StreamEvent, receiver_stream};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default API root.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Async client for an OpenAI-compatible chat completions endpoint.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
struct CompletionsBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct RawCompletion {
    choices: Option<Vec<RawChoice>>,
    error: Option<RawError>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawMessage,
}

#[derive(Deserialize, Debug)]
struct RawMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawError {
    message: String,
}

#[derive(Deserialize, Debug)]
struct StreamChunk {
    choices: Option<Vec<StreamChoice>>,
}

#[derive(Deserialize, Debug)]
struct StreamChoice {
    delta: Option<StreamDelta>,
}

#[derive(Deserialize, Debug)]
struct StreamDelta {
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a client with the given API key and default endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("umbra-rs/0.2")
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
        })
    }

    /// Point the client at a compatible non-default endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn post(
        &self,
        request: &ChatRequest,
        stream: bool,
    ) -> Result<reqwest::Response, String> {
        let body = CompletionsBody {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream,
        };

        debug!(
            "OpenAI request: model={}, messages={}, max_tokens={}, stream={}",
            request.model,
            request.messages.len(),
            request.max_tokens,
            stream,
        );

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("OpenAI API HTTP {status}: {text}"));
        }
        Ok(resp)
    }
}

/// Extract the text delta from one streamed chunk payload, if any.
fn parse_stream_data(data: &str) -> Option<String> {
    let chunk: StreamChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            warn!("Skipping unparseable stream chunk: {e}");
            return None;
        }
    };
    chunk
        .choices
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.delta)
        .and_then(|d| d.content)
        .filter(|s| !s.is_empty())
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, String> {
        let resp = self.post(request, false).await?;
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        let parsed: RawCompletion =
            serde_json::from_str(&text).map_err(|e| format!("failed to parse response: {e}"))?;

        if let Some(err) = parsed.error {
            return Err(format!("OpenAI API error: {}", err.message));
        }

        parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message.content)
            .ok_or_else(|| "Empty LLM response".to_string())
    }

    async fn stream(&self, request: &ChatRequest) -> Result<DeltaStream, String> {
        let mut resp = self.post(request, true).await?;
        let (tx, rx) = tokio::sync::mpsc::channel(32);

        tokio::spawn(async move {
            let mut parser = SseParser::new();
            loop {
                let chunk = match resp.chunk().await {
                    Ok(Some(chunk)) => chunk,
                    Ok(None) => break,
                    Err(e) => {
                        let _ = tx
                            .send(StreamEvent::Error(format!("stream read failed: {e}")))
                            .await;
                        return;
                    }
                };

                for frame in parser.push(&String::from_utf8_lossy(&chunk)) {
                    match frame {
                        SseFrame::Done => {
                            let _ = tx.send(StreamEvent::Done).await;
                            return;
                        }
                        SseFrame::Data(data) => {
                            if let Some(delta) = parse_stream_data(&data) {
                                // Receiver dropped means the consumer is
                                // gone; stop reading.
                                if tx.send(StreamEvent::TextDelta(delta)).await.is_err() {
                                    return;
                                }
                            }
                        }
                    }
                }
            }

            // Flush a trailing partial frame, then close out the stream.
            if let Some(SseFrame::Data(data)) = parser.finish() {
                if let Some(delta) = parse_stream_data(&data) {
                    let _ = tx.send(StreamEvent::TextDelta(delta)).await;
                }
            }
            let _ = tx.send(StreamEvent::Done).await;
        });

        Ok(receiver_stream(rx))
    }
}

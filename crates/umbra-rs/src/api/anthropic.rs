//! Anthropic messages client.
//!
//! Implements [`ChatClient`] over the `/v1/messages` wire shape. The
//! messages API rejects `system` entries in the message list — system
//! content must travel in the top-level `system` field — so this client
//! extracts and joins system messages before sending. That constraint is
//! the reason completed summaries are re-injected as user-role messages
//! rather than system-role ones (see [`crate::summary::prompt`]).

use crate::Role;
use crate::api::streaming::{SseFrame, SseParser};
use crate::api::{ChatClient, ChatMessage, ChatRequest, DeltaStream, StreamEvent, receiver_stream};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default API root.
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";

/// API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Headroom added above the thinking budget so text output still fits.
const THINKING_MAX_TOKENS_HEADROOM: u32 = 1024;

/// Async client for the Anthropic messages endpoint.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking: Option<ThinkingParam>,
}

#[derive(Serialize, Debug)]
struct ThinkingParam {
    #[serde(rename = "type")]
    kind: &'static str,
    budget_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct RawResponse {
    content: Option<Vec<RawContentBlock>>,
    error: Option<RawError>,
}

#[derive(Deserialize, Debug)]
struct RawContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawError {
    message: String,
}

#[derive(Deserialize, Debug)]
struct StreamPayload {
    #[serde(rename = "type")]
    kind: String,
    delta: Option<PayloadDelta>,
    error: Option<RawError>,
}

#[derive(Deserialize, Debug)]
struct PayloadDelta {
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<String>,
}

/// Split system messages out of the list, joining their content for the
/// top-level `system` field.
fn split_system(messages: &[ChatMessage]) -> (Option<String>, Vec<ChatMessage>) {
    let mut system_parts = Vec::new();
    let mut rest = Vec::new();
    for msg in messages {
        match msg.role {
            Role::System => system_parts.push(msg.content.clone()),
            _ => rest.push(msg.clone()),
        }
    }
    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };
    (system, rest)
}

/// What one streamed payload means for the consumer, if anything.
fn parse_stream_data(data: &str) -> Option<StreamEvent> {
    let payload: StreamPayload = match serde_json::from_str(data) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Skipping unparseable stream payload: {e}");
            return None;
        }
    };

    match payload.kind.as_str() {
        "content_block_delta" => payload
            .delta
            .filter(|d| d.kind.as_deref() == Some("text_delta"))
            .and_then(|d| d.text)
            .filter(|s| !s.is_empty())
            .map(StreamEvent::TextDelta),
        "message_stop" => Some(StreamEvent::Done),
        "error" => {
            let message = payload
                .error
                .map_or_else(|| "unknown stream error".to_string(), |e| e.message);
            Some(StreamEvent::Error(format!("Anthropic API error: {message}")))
        }
        // message_start, content_block_start/stop, ping, message_delta:
        // nothing the consumer needs.
        _ => None,
    }
}

impl AnthropicClient {
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
            base_url: ANTHROPIC_BASE_URL.to_string(),
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
        let (system, messages) = split_system(&request.messages);

        let thinking = request
            .thinking_budget
            .filter(|b| *b > 0)
            .map(|budget_tokens| ThinkingParam {
                kind: "enabled",
                budget_tokens,
            });

        // Thinking constraints: max_tokens must exceed the budget, and
        // temperature is not accepted alongside thinking.
        let max_tokens = match &thinking {
            Some(t) => request.max_tokens.max(t.budget_tokens + THINKING_MAX_TOKENS_HEADROOM),
            None => request.max_tokens,
        };
        let temperature = match &thinking {
            Some(_) => None,
            None => Some(request.temperature),
        };

        let body = MessagesBody {
            model: &request.model,
            max_tokens,
            messages,
            system,
            temperature,
            stream,
            thinking,
        };

        debug!(
            "Anthropic request: model={}, messages={}, max_tokens={}, stream={}",
            request.model,
            body.messages.len(),
            body.max_tokens,
            stream,
        );

        let resp = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("Anthropic API HTTP {status}: {text}"));
        }
        Ok(resp)
    }
}

#[async_trait]
impl ChatClient for AnthropicClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, String> {
        let resp = self.post(request, false).await?;
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        let parsed: RawResponse =
            serde_json::from_str(&text).map_err(|e| format!("failed to parse response: {e}"))?;

        if let Some(err) = parsed.error {
            return Err(format!("Anthropic API error: {}", err.message));
        }

        let combined = parsed
            .content
            .unwrap_or_default()
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if combined.is_empty() {
            Err("Empty LLM response".to_string())
        } else {
            Ok(combined)
        }
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
                    let event = match frame {
                        SseFrame::Done => Some(StreamEvent::Done),
                        SseFrame::Data(data) => parse_stream_data(&data),
                    };
                    if let Some(event) = event {
                        let terminal =
                            matches!(&event, StreamEvent::Done | StreamEvent::Error(_));
                        if tx.send(event).await.is_err() || terminal {
                            return;
                        }
                    }
                }
            }
            let _ = tx.send(StreamEvent::Done).await;
        });

        Ok(receiver_stream(rx))
    }
}

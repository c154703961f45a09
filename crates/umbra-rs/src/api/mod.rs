//! Provider interaction layer: the chat capability and its implementations.
//!
//! The summarization core consumes upstream LLMs through the
//! [`ChatClient`] capability — a model id, a flat list of role/content
//! messages, and generation options in; either a single completed string
//! or an async stream of text deltas out. Two implementations ship here:
//!
//! - [`OpenAiClient`](openai::OpenAiClient) — chat-completions wire shape.
//! - [`AnthropicClient`](anthropic::AnthropicClient) — messages wire
//!   shape; system content is extracted into the top-level `system` field
//!   (which is why summaries are never sent as `system` role — see
//!   [`crate::summary::prompt`]).
//!
//! [`models`] answers capability questions (reasoning support, output
//! ceilings, thinking budgets) that shape requests; [`streaming`] holds
//! the shared SSE frame parser. Retry/backoff is deliberately absent.

pub mod anthropic;
pub mod models;
pub mod openai;
pub mod streaming;

pub use anthropic::AnthropicClient;
pub use models::{max_output_tokens, supports_reasoning, thinking_budget};
pub use openai::OpenAiClient;

use crate::Role;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Serialize;

/// A role/content pair as providers consume it. The richer crate-level
/// [`Message`](crate::Message) is flattened to this shape at the API
/// boundary.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A chat request as the capability sees it: model, messages, options.
#[derive(Clone, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Extended-thinking token budget; `None` disables thinking. Callers
    /// derive this from [`models::thinking_budget`].
    pub thinking_budget: Option<u32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: 1024,
            temperature: 0.3,
            thinking_budget: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_thinking_budget(mut self, budget: Option<u32>) -> Self {
        self.thinking_budget = budget;
        self
    }
}

/// A single event from a streaming generation.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An incremental text content delta.
    TextDelta(String),
    /// The stream completed normally.
    Done,
    /// The stream failed; no further events follow.
    Error(String),
}

/// The async-iterable form of a generation: text deltas until `Done` or
/// `Error`.
pub type DeltaStream = BoxStream<'static, StreamEvent>;

/// The LLM capability the summarization core consumes.
///
/// Both modes are required: summaries may be generated through either a
/// provider's streaming path (for live UI updates and cancellation) or a
/// one-shot completion.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// One-shot completion: the final text, or an error.
    async fn complete(&self, request: &ChatRequest) -> Result<String, String>;

    /// Streaming completion: an async sequence of [`StreamEvent`]s ending
    /// in `Done` or `Error`.
    async fn stream(&self, request: &ChatRequest) -> Result<DeltaStream, String>;
}

/// Wrap a `tokio` mpsc receiver as a [`DeltaStream`].
///
/// Providers spawn a reader task that pushes events into the channel; the
/// consumer side is a plain `futures` stream so callers can `select!` it
/// against a cancellation token.
pub(crate) fn receiver_stream(rx: tokio::sync::mpsc::Receiver<StreamEvent>) -> DeltaStream {
    Box::pin(futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (event, rx))
    }))
}

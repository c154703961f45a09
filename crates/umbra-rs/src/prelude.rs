//! Convenience re-exports for common `umbra-rs` types.
//!
//! Meant to be glob-imported by chat-client front ends:
//!
//! ```ignore
//! use umbra_rs::prelude::*;
//! ```
//!
//! This pulls in the message types, the store, the resolver/selector
//! functions, the summarization entry point, and the provider clients.
//! Specialized types (SSE parser, wire bodies, observer impls beyond the
//! basics) are intentionally excluded — import those from their modules
//! directly when needed.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{DEFAULT_MODEL, Message, MessageKind, Role};

// ── History ─────────────────────────────────────────────────────────
pub use crate::history::{
    MessageStore, build_messages_for_api, count_shadowed_messages, find_summary_indices,
    messages_to_summarize,
};

// ── Summarization ───────────────────────────────────────────────────
pub use crate::summary::{
    LoggingObserver, NoopObserver, SummaryEvent, SummaryObserver, SummaryOutcome, SummaryPhase,
    SummarySettings, summarize, summary_insertion_index, to_outbound,
};

// ── Provider capability ─────────────────────────────────────────────
pub use crate::api::{
    AnthropicClient, ChatClient, ChatMessage, ChatRequest, OpenAiClient, StreamEvent,
};

// ── Persistence capability ──────────────────────────────────────────
pub use crate::kv::{JsonFileStore, KeyValueStore, MemoryStore};

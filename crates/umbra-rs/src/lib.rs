//! Conversation summarization and message shadowing for LLM chat clients.
//!
//! `umbra-rs` implements the history-management core of a chat client that
//! talks to OpenAI- and Anthropic-style conversational APIs. A conversation
//! is an ordered list of [`Message`] entries; some of those entries are
//! **summaries** — compressed replacements for a run of earlier messages.
//! An active summary *shadows* everything before it: the shadowed messages
//! stay visible in the UI history but are excluded from the message list
//! sent upstream on each turn.
//!
//! # Where to find things
//!
//! If you're looking for how to...
//!
//! - **Hold and mutate a conversation:** see [`MessageStore`](history::MessageStore).
//!   It owns the history, normalizes content at ingestion, and applies
//!   streamed summary chunks atomically.
//!
//! - **Compute what gets sent to the API:** see
//!   [`build_messages_for_api`](history::build_messages_for_api). Pure
//!   function of a history snapshot; call it as often as you like.
//!
//! - **Pick what a new summary would fold:** see
//!   [`messages_to_summarize`](history::messages_to_summarize) and
//!   [`count_shadowed_messages`](history::count_shadowed_messages).
//!
//! - **Generate a summary:** see [`summarize`](summary::summarize). It
//!   selects candidates, inserts a placeholder, streams text from a
//!   [`ChatClient`](api::ChatClient), and activates the summary on success.
//!
//! - **Talk to a provider:** see [`api::OpenAiClient`] and
//!   [`api::AnthropicClient`], both implementing the [`api::ChatClient`]
//!   capability in streaming and one-shot modes.
//!
//! - **Persist settings and conversations:** see the
//!   [`KeyValueStore`](kv::KeyValueStore) capability and
//!   [`JsonFileStore`](kv::JsonFileStore).
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`history`] | [`MessageStore`](history::MessageStore), shadow resolution, candidate selection |
//! | [`summary`] | [`summarize`](summary::summarize) lifecycle, prompt building, settings, observer events |
//! | [`api`] | [`ChatClient`](api::ChatClient) capability, provider clients, SSE parsing, model capability lookup |
//! | [`kv`] | Key-value persistence capability with fail-soft JSON file backend |
//!
//! # Design principles
//!
//! 1. **The resolver is pure.** Shadow resolution runs on every render and
//!    every outbound call, so it is a total, side-effect-free function of a
//!    history snapshot. Calling it twice yields identical results.
//!
//! 2. **Mutation lives in one place.** Only [`MessageStore`](history::MessageStore)
//!    mutates the history. The lifecycle manager applies streamed chunks
//!    through it and reports progress through observer events, never through
//!    shared mutable message objects.
//!
//! 3. **Ambiguous summaries never shadow.** A summary is inserted inactive
//!    and flipped active only when generation completes with content. A
//!    failed or cancelled generation removes the placeholder.

pub mod api;
pub mod history;
pub mod kv;
pub mod prelude;
pub mod summary;

use serde::{Deserialize, Serialize};

// ── Constants ──────────────────────────────────────────────────────

/// Hardcoded fallback model, used when neither a summary-model override,
/// a per-conversation override, nor a global default is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Discriminator for non-ordinary entries. Absent on ordinary messages.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    #[serde(rename = "summary")]
    Summary,
}

/// A single entry in the conversation history.
///
/// Ordinary messages carry `kind: None`. Summary entries carry
/// `kind: Some(Summary)` and an optional `summary_active` flag; when the
/// flag is absent the summary is active (default-active policy).
/// `summary_active` is meaningful only on summaries and ignored elsewhere.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    /// Text content. Always a string — arbitrary JSON content is normalized
    /// once at the [`MessageStore`](history::MessageStore) boundary.
    pub content: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_active: Option<bool>,
    /// Which model produced this entry (set on assistant and summary messages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            kind: None,
            summary_active: None,
            model: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            kind: None,
            summary_active: None,
            model: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            kind: None,
            summary_active: None,
            model: None,
        }
    }

    /// Construct a summary entry. Summaries are system-role internally;
    /// they are re-shaped to user-role messages when sent to a provider
    /// (see [`summary::prompt::summary_api_message`]).
    pub fn summary(content: impl Into<String>, active: bool) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            kind: Some(MessageKind::Summary),
            summary_active: Some(active),
            model: None,
        }
    }

    /// Attach the producing model id.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    // ── Summary classifier ─────────────────────────────────────────

    /// True iff this entry is a summary.
    pub fn is_summary(&self) -> bool {
        matches!(self.kind, Some(MessageKind::Summary))
    }

    /// True iff this entry is a summary that currently shadows.
    ///
    /// Non-summaries are never active summaries. A summary without an
    /// explicit `summary_active: false` is active.
    pub fn is_active_summary(&self) -> bool {
        self.is_summary() && self.summary_active.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors() {
        let sys = Message::system("hello");
        assert_eq!(sys.role, Role::System);
        assert_eq!(sys.content, "hello");
        assert!(!sys.is_summary());

        let user = Message::user("world");
        assert_eq!(user.role, Role::User);

        let assist = Message::assistant("reply").with_model("gpt-4o");
        assert_eq!(assist.role, Role::Assistant);
        assert_eq!(assist.model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn summary_constructor_sets_discriminator() {
        let s = Message::summary("folded", true);
        assert_eq!(s.role, Role::System);
        assert!(s.is_summary());
        assert!(s.is_active_summary());

        let inactive = Message::summary("folded", false);
        assert!(inactive.is_summary());
        assert!(!inactive.is_active_summary());
    }

    #[test]
    fn classifier_is_total_over_any_message() {
        // Ordinary message with a stray summary_active flag: the flag is
        // ignored because the entry is not a summary.
        let mut odd = Message::user("hi");
        odd.summary_active = Some(true);
        assert!(!odd.is_summary());
        assert!(!odd.is_active_summary());
    }

    #[test]
    fn default_active_policy() {
        // Absence of the flag means active.
        let mut s = Message::summary("folded", true);
        s.summary_active = None;
        assert!(s.is_active_summary());
    }

    #[test]
    fn serde_round_trip_preserves_summary_fields() {
        let s = Message::summary("state so far", false).with_model("claude-sonnet-4");
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"type\":\"summary\""));

        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn ordinary_message_serializes_without_optional_fields() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert!(json.get("type").is_none());
        assert!(json.get("summary_active").is_none());
        assert!(json.get("model").is_none());
    }
}

//! Message store: the single owner and mutator of a conversation history.
//!
//! Everything else in the crate reads snapshots (`&[Message]`) and never
//! mutates. The store enforces the typed-content invariant at its
//! boundary: whatever shape a caller hands in ([`serde_json::Value`] from
//! a UI bridge, persisted JSON, raw strings), it is normalized to a
//! `String` exactly once, here. Downstream code assumes `content` is text.
//!
//! The store also carries the conversation's identity and per-conversation
//! model override, and round-trips through the key-value capability as a
//! single JSON record. Corrupt or missing records fall back to a fresh
//! conversation — persistence problems never propagate as errors into the
//! resolver or the lifecycle manager.

use crate::history::shadow;
use crate::kv::KeyValueStore;
use crate::{Message, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Prefix for conversation records in the key-value store.
const CONVERSATION_KEY_PREFIX: &str = "conversation/";

/// Persisted form of a conversation.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct ConversationRecord {
    id: String,
    title: Option<String>,
    model_override: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    messages: Vec<Message>,
}

/// Ordered, index-addressed conversation history with a mutation API.
///
/// Append-only by default; summaries are inserted mid-history, deletions
/// truncate. Never reordered.
#[derive(Debug, Clone)]
pub struct MessageStore {
    id: String,
    title: Option<String>,
    model_override: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    messages: Vec<Message>,
}

impl MessageStore {
    /// Create an empty conversation with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: None,
            model_override: None,
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    // ── Identity & metadata ────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
        self.touch();
    }

    /// The conversation's own model override, if any.
    pub fn model_override(&self) -> Option<&str> {
        self.model_override.as_deref()
    }

    pub fn set_model_override(&mut self, model: Option<String>) {
        self.model_override = model;
        self.touch();
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ── Snapshot access ────────────────────────────────────────────

    /// The full history, in conversation order. This is the snapshot the
    /// pure resolver and selector functions operate on.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    /// Convenience: the API view of the current history.
    pub fn api_view(&self) -> Vec<Message> {
        shadow::build_messages_for_api(&self.messages)
    }

    // ── Mutation ───────────────────────────────────────────────────

    /// Append a typed message. Returns its index.
    pub fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.touch();
        self.messages.len() - 1
    }

    /// Append a message whose content arrives as arbitrary JSON.
    ///
    /// This is the normalization boundary: strings pass through, null
    /// becomes empty, anything else is rendered as JSON text.
    pub fn ingest(&mut self, role: Role, content: serde_json::Value) -> usize {
        let message = match role {
            Role::System => Message::system(normalize_content(content)),
            Role::User => Message::user(normalize_content(content)),
            Role::Assistant => Message::assistant(normalize_content(content)),
        };
        self.push(message)
    }

    /// Insert a message at `index`, clamped to the current length.
    pub fn insert(&mut self, index: usize, message: Message) -> usize {
        let index = index.min(self.messages.len());
        self.messages.insert(index, message);
        self.touch();
        index
    }

    /// Replace the content of the message at `index`. Returns `false` if
    /// the index is out of range.
    pub fn edit(&mut self, index: usize, content: impl Into<String>) -> bool {
        match self.messages.get_mut(index) {
            Some(msg) => {
                msg.content = content.into();
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Remove and return the message at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Message> {
        if index >= self.messages.len() {
            return None;
        }
        let removed = self.messages.remove(index);
        self.touch();
        Some(removed)
    }

    /// Delete the message at `index` and everything after it
    /// ("delete all below"). A no-op when `index` is past the end.
    pub fn truncate_from(&mut self, index: usize) {
        if index < self.messages.len() {
            self.messages.truncate(index);
            self.touch();
        }
    }

    // ── Summary mutation ───────────────────────────────────────────

    /// Flip the active flag of the summary at `index`. Returns the new
    /// state, or `None` if the entry is not a summary (no-op).
    pub fn toggle_summary(&mut self, index: usize) -> Option<bool> {
        let msg = self.messages.get_mut(index)?;
        if !msg.is_summary() {
            return None;
        }
        let next = !msg.summary_active.unwrap_or(true);
        msg.summary_active = Some(next);
        self.touch();
        Some(next)
    }

    /// Append a streamed chunk to the summary at `index`.
    ///
    /// One call per chunk, one assignment per call: a concurrent snapshot
    /// read sees either the content before or after the whole chunk. The
    /// entry's kind and active flags are never touched here. Returns
    /// `false` if the index does not hold a summary.
    pub fn apply_summary_chunk(&mut self, index: usize, delta: &str) -> bool {
        match self.messages.get_mut(index) {
            Some(msg) if msg.is_summary() => {
                msg.content.push_str(delta);
                self.touch();
                true
            }
            _ => false,
        }
    }

    /// Mark the summary at `index` complete: activate it and record the
    /// producing model. Returns `false` if the index does not hold a
    /// summary.
    pub fn complete_summary(&mut self, index: usize, model: impl Into<String>) -> bool {
        match self.messages.get_mut(index) {
            Some(msg) if msg.is_summary() => {
                msg.summary_active = Some(true);
                msg.model = Some(model.into());
                self.touch();
                true
            }
            _ => false,
        }
    }

    // ── Persistence ────────────────────────────────────────────────

    /// Save the conversation through the key-value capability.
    pub fn save(&self, kv: &dyn KeyValueStore) -> Result<(), String> {
        let record = ConversationRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            model_override: self.model_override.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            messages: self.messages.clone(),
        };
        let value = serde_json::to_value(&record)
            .map_err(|e| format!("Failed to serialize conversation {}: {e}", self.id))?;
        kv.set(&format!("{CONVERSATION_KEY_PREFIX}{}", self.id), value)
    }

    /// Load a conversation by id. Missing or corrupt records fall back to
    /// a fresh empty conversation — never an error.
    pub fn load(kv: &dyn KeyValueStore, id: &str) -> Self {
        let key = format!("{CONVERSATION_KEY_PREFIX}{id}");
        match kv.get(&key) {
            Some(value) => match serde_json::from_value::<ConversationRecord>(value) {
                Ok(record) => {
                    debug!(
                        "Loaded conversation {id}: {} message(s)",
                        record.messages.len()
                    );
                    Self {
                        id: record.id,
                        title: record.title,
                        model_override: record.model_override,
                        created_at: record.created_at,
                        updated_at: record.updated_at,
                        messages: record.messages,
                    }
                }
                Err(e) => {
                    warn!("Corrupt conversation record for {id}, starting fresh: {e}");
                    Self::new(id)
                }
            },
            None => Self::new(id),
        }
    }
}

/// Normalize arbitrary JSON content to text. Strings pass through, null
/// becomes empty, everything else is rendered as JSON.
fn normalize_content(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

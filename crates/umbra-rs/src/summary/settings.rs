//! Summary generation settings and model resolution.
//!
//! An explicit configuration object, loaded once from the key-value
//! capability and passed into the lifecycle manager at call time —
//! nothing here is read ad hoc from global state. Reload on explicit
//! user action by calling [`SummarySettings::load`] again.

use crate::DEFAULT_MODEL;
use crate::kv::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Key under which the settings are persisted.
pub const SETTINGS_KEY: &str = "settings/summary";

/// Settings governing summary generation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SummarySettings {
    /// Summary-specific model override. When set, it wins over every
    /// other source.
    pub summary_model: Option<String>,
    /// The globally selected default chat model.
    pub selected_model: Option<String>,
    /// Cap on summary response tokens.
    pub max_summary_tokens: u32,
    /// Sampling temperature for summarization.
    pub temperature: f32,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            summary_model: None,
            selected_model: None,
            max_summary_tokens: 2048,
            temperature: 0.3,
        }
    }
}

impl SummarySettings {
    /// Resolve the model to summarize with. Order:
    ///
    /// 1. the global summary-model override,
    /// 2. the conversation's own model override,
    /// 3. the globally selected default model,
    /// 4. the hardcoded fallback.
    ///
    /// The explicit global override always wins over conversation-level
    /// settings.
    pub fn effective_summary_model(&self, conversation_override: Option<&str>) -> String {
        self.summary_model
            .as_deref()
            .or(conversation_override)
            .or(self.selected_model.as_deref())
            .unwrap_or(DEFAULT_MODEL)
            .to_string()
    }

    /// Load settings from the key-value capability. Missing or corrupt
    /// values fall back to defaults — never an error.
    pub fn load(kv: &dyn KeyValueStore) -> Self {
        match kv.get(SETTINGS_KEY) {
            Some(value) => match serde_json::from_value(value) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Corrupt summary settings, using defaults: {e}");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    /// Persist the settings through the key-value capability.
    pub fn save(&self, kv: &dyn KeyValueStore) -> Result<(), String> {
        let value = serde_json::to_value(self)
            .map_err(|e| format!("Failed to serialize summary settings: {e}"))?;
        kv.set(SETTINGS_KEY, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use serde_json::json;

    #[test]
    fn global_override_wins_over_everything() {
        let settings = SummarySettings {
            summary_model: Some("claude-3-5-haiku-latest".into()),
            selected_model: Some("gpt-4o".into()),
            ..Default::default()
        };
        assert_eq!(
            settings.effective_summary_model(Some("claude-sonnet-4")),
            "claude-3-5-haiku-latest"
        );
    }

    #[test]
    fn conversation_override_beats_selected_model() {
        let settings = SummarySettings {
            selected_model: Some("gpt-4o".into()),
            ..Default::default()
        };
        assert_eq!(
            settings.effective_summary_model(Some("claude-sonnet-4")),
            "claude-sonnet-4"
        );
    }

    #[test]
    fn selected_model_then_hardcoded_fallback() {
        let settings = SummarySettings {
            selected_model: Some("gpt-4o".into()),
            ..Default::default()
        };
        assert_eq!(settings.effective_summary_model(None), "gpt-4o");

        let bare = SummarySettings::default();
        assert_eq!(bare.effective_summary_model(None), DEFAULT_MODEL);
    }

    #[test]
    fn load_missing_returns_defaults() {
        let kv = MemoryStore::new();
        assert_eq!(SummarySettings::load(&kv), SummarySettings::default());
    }

    #[test]
    fn load_corrupt_returns_defaults() {
        let kv = MemoryStore::new();
        kv.set(SETTINGS_KEY, json!({"max_summary_tokens": "not a number"}))
            .unwrap();
        assert_eq!(SummarySettings::load(&kv), SummarySettings::default());
    }

    #[test]
    fn partial_record_fills_missing_fields_from_defaults() {
        let kv = MemoryStore::new();
        kv.set(SETTINGS_KEY, json!({"summary_model": "gpt-4o-mini"}))
            .unwrap();
        let loaded = SummarySettings::load(&kv);
        assert_eq!(loaded.summary_model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(loaded.max_summary_tokens, 2048);
    }

    #[test]
    fn save_load_round_trip() {
        let kv = MemoryStore::new();
        let settings = SummarySettings {
            summary_model: Some("claude-3-5-haiku-latest".into()),
            selected_model: Some("claude-sonnet-4".into()),
            max_summary_tokens: 1024,
            temperature: 0.5,
        };
        settings.save(&kv).unwrap();
        assert_eq!(SummarySettings::load(&kv), settings);
    }
}

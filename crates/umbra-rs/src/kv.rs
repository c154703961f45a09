//! Key-value persistence capability.
//!
//! The summarization core persists two things through this seam: the
//! summary settings and conversation records. The contract is fail-soft
//! on the read side — a missing or unparseable value is `None`, never an
//! error — so corrupt storage degrades to defaults instead of taking the
//! resolver or lifecycle manager down with it.
//!
//! [`JsonFileStore`] is the production backend: a single JSON object file,
//! written atomically (temp file + rename). [`MemoryStore`] backs tests.

use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Get/set JSON values under string keys.
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value under `key`. Missing or unreadable values are
    /// `None`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`.
    fn set(&self, key: &str, value: Value) -> Result<(), String>;
}

// ── File-backed store ──────────────────────────────────────────────

/// File-backed store: one JSON object per file, loaded once at open.
///
/// A corrupt or missing file opens as an empty map with a warning. Every
/// `set` rewrites the file atomically: serialize to a sibling temp file,
/// then rename into place.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, Value>>,
}

impl JsonFileStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, String> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create store dir: {e}"))?;
        }
        let entries = Self::read_entries(&path);
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn read_entries(path: &Path) -> HashMap<String, Value> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return HashMap::new(), // first run or unreadable: start empty
        };
        match serde_json::from_str::<HashMap<String, Value>>(&text) {
            Ok(map) => map,
            Err(e) => {
                warn!("Corrupt store file {}, starting empty: {e}", path.display());
                HashMap::new()
            }
        }
    }

    fn write_entries(&self, entries: &HashMap<String, Value>) -> Result<(), String> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| format!("Failed to serialize store: {e}"))?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json).map_err(|e| format!("Failed to write store: {e}"))?;
        std::fs::rename(&tmp_path, &self.path)
            .map_err(|e| format!("Failed to rename store into place: {e}"))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), String> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value);
        self.write_entries(&entries)
    }
}

// ── In-memory store ────────────────────────────────────────────────

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), String> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_store_get_set() {
        let store = MemoryStore::new();
        assert!(store.get("missing").is_none());
        store.set("k", json!({"n": 1})).unwrap();
        assert_eq!(store.get("k"), Some(json!({"n": 1})));
    }

    #[test]
    fn file_store_round_trips_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("summary_model", json!("gpt-4o-mini")).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("summary_model"), Some(json!("gpt-4o-mini")));
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.get("anything").is_none());

        // And recovers on the next write.
        store.set("k", json!(true)).unwrap();
        assert_eq!(store.get("k"), Some(json!(true)));
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("fresh.json")).unwrap();
        assert!(store.get("k").is_none());
    }
}

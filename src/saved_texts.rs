//! Saved practice texts, newest first.
//!
//! The whole collection is read once when the store is opened and rewritten
//! in full after every mutation. There is no delta persistence; the last
//! write wins.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{Rejection, StoreError};
use crate::kv::KeyValueStore;
use crate::session::{Session, SessionEvent};

/// Key the collection is persisted under.
pub const SAVED_TEXTS_KEY: &str = "typingSimulatorTexts";
pub const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedTextEntry {
    pub id: String,
    pub text: String,
    pub preview: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// First [`PREVIEW_CHARS`] characters, with `...` appended when truncated.
pub fn make_preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().nth(PREVIEW_CHARS).is_some() {
        preview.push_str("...");
    }
    preview
}

#[derive(Debug)]
pub struct SavedTextStore<K: KeyValueStore> {
    entries: Vec<SavedTextEntry>,
    backend: K,
}

impl<K: KeyValueStore> SavedTextStore<K> {
    /// Load the collection from `backend`. Unreadable or corrupt data is
    /// logged and replaced by an empty collection.
    pub fn open(backend: K) -> Self {
        let entries = match Self::read(&backend) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("failed to load saved texts, starting empty: {}", e);
                Vec::new()
            }
        };
        info!(count = entries.len(), "loaded saved texts");
        Self { entries, backend }
    }

    fn read(backend: &K) -> Result<Vec<SavedTextEntry>, StoreError> {
        match backend.get(SAVED_TEXTS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&self) {
        let result = serde_json::to_string_pretty(&self.entries)
            .map_err(StoreError::from)
            .and_then(|json| self.backend.set(SAVED_TEXTS_KEY, &json));
        if let Err(e) = result {
            error!("failed to persist saved texts: {}", e);
        }
    }

    fn unique_id(&self, now_ms: i64) -> String {
        let mut candidate = now_ms;
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }

    /// Prepend `text` as a new entry. Blank text is rejected.
    pub fn save(&mut self, text: &str, now_ms: i64) -> Result<&SavedTextEntry, Rejection> {
        if text.trim().is_empty() {
            return Err(Rejection::EmptyText);
        }

        let entry = SavedTextEntry {
            id: self.unique_id(now_ms),
            text: text.to_string(),
            preview: make_preview(text),
            timestamp: now_ms,
        };
        info!(id = %entry.id, "saved text");
        self.entries.insert(0, entry);
        self.persist();
        Ok(&self.entries[0])
    }

    /// Entries whose text contains `query`, ignoring case. A blank query
    /// matches everything. Order is preserved.
    pub fn list(&self, query: &str) -> Vec<&SavedTextEntry> {
        if query.trim().is_empty() {
            return self.entries.iter().collect();
        }
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.text.to_lowercase().contains(&query))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&SavedTextEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Remove the entry with `id`. Returns whether anything was removed;
    /// the collection is persisted either way.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        let removed = self.entries.len() != before;
        if removed {
            info!(id, "deleted saved text");
        }
        self.persist();
        removed
    }

    /// Make the entry `id` the session's source text.
    pub fn load_into(&self, id: &str, session: &mut Session) -> Result<(), Rejection> {
        if session.is_running() {
            return Err(Rejection::LoadWhileRunning);
        }
        let entry = self
            .get(id)
            .ok_or_else(|| Rejection::UnknownEntry(id.to_string()))?;
        session.apply(SessionEvent::SetSource(entry.text.clone()))?;
        Ok(())
    }

    pub fn entries(&self) -> &[SavedTextEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }
}

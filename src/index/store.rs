//! In-memory vector store.
//!
//! Holds one [`Entry`] per note id, the sync state (id to the last indexed
//! `updated_time`), and the provider tag the vectors were built with. The
//! entry map and sync state only change together.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::embeddings::EmbeddingProviderType;

/// A note's indexed representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    /// Unit-normalized, or all zeros if the backend returned a zero vector.
    pub embedding: Vec<f32>,
    /// `"<folder> > <title>\n\n<body>"`, untruncated.
    pub text: String,
    /// Corpus `updated_time` when the entry was computed.
    pub updated_time: i64,
}

#[derive(Debug, Clone, Default)]
pub struct IndexStore {
    entries: HashMap<String, Entry>,
    sync_state: HashMap<String, i64>,
    provider: Option<EmbeddingProviderType>,
}

impl IndexStore {
    /// An empty store bound to `provider`.
    #[must_use]
    pub fn new(provider: EmbeddingProviderType) -> Self {
        Self {
            provider: Some(provider),
            ..Self::default()
        }
    }

    /// An empty store not built with any provider yet.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A store loaded from a snapshot. Sync state is taken from the entries.
    #[must_use]
    pub fn from_entries(provider: EmbeddingProviderType, entries: Vec<Entry>) -> Self {
        let mut store = Self::new(provider);
        for entry in entries {
            store.upsert(entry);
        }
        store
    }

    /// Insert or replace an entry. Returns `true` if an entry was replaced.
    pub fn upsert(&mut self, entry: Entry) -> bool {
        self.sync_state.insert(entry.id.clone(), entry.updated_time);
        self.entries.insert(entry.id.clone(), entry).is_some()
    }

    /// Remove an entry and its sync state. Returns `true` if it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.sync_state.remove(id);
        self.entries.remove(id).is_some()
    }

    /// All entries, ordered by id.
    #[must_use]
    pub fn all(&self) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self.entries.values().cloned().collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries
    }

    /// Drop every entry and all sync state. The provider tag is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.sync_state.clear();
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Timestamp the note was last indexed at; 0 if never.
    #[must_use]
    pub fn last_indexed(&self, id: &str) -> i64 {
        self.sync_state.get(id).copied().unwrap_or(0)
    }

    /// Ids of all stored entries, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn provider(&self) -> Option<EmbeddingProviderType> {
        self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, ts: i64) -> Entry {
        Entry {
            id: id.to_string(),
            embedding: vec![1.0, 0.0],
            text: format!("Folder > {id}\n\nbody"),
            updated_time: ts,
        }
    }

    #[test]
    fn test_upsert_and_replace() {
        let mut store = IndexStore::new(EmbeddingProviderType::Ollama);
        assert!(!store.upsert(entry("a", 10)));
        assert!(store.upsert(entry("a", 20)));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().updated_time, 20);
        assert_eq!(store.last_indexed("a"), 20);
    }

    #[test]
    fn test_remove_clears_sync_state() {
        let mut store = IndexStore::new(EmbeddingProviderType::Ollama);
        store.upsert(entry("a", 10));

        assert!(store.remove("a"));
        assert!(!store.contains("a"));
        assert_eq!(store.last_indexed("a"), 0);
        assert!(!store.remove("a"));
    }

    #[test]
    fn test_all_ordered_by_id() {
        let store = IndexStore::from_entries(
            EmbeddingProviderType::Openai,
            vec![entry("c", 1), entry("a", 2), entry("b", 3)],
        );
        let ids: Vec<String> = store.all().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(store.ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_from_entries_populates_sync_state() {
        let store = IndexStore::from_entries(EmbeddingProviderType::Ollama, vec![entry("a", 42)]);
        assert_eq!(store.last_indexed("a"), 42);
        assert_eq!(store.last_indexed("missing"), 0);
        assert_eq!(store.provider(), Some(EmbeddingProviderType::Ollama));
    }

    #[test]
    fn test_clear_keeps_provider() {
        let mut store = IndexStore::from_entries(EmbeddingProviderType::Ollama, vec![entry("a", 1)]);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.last_indexed("a"), 0);
        assert_eq!(store.provider(), Some(EmbeddingProviderType::Ollama));
        assert_eq!(IndexStore::empty().provider(), None);
    }

    #[test]
    fn test_entry_json_field_names() {
        let json = serde_json::to_value(entry("a", 7)).unwrap();
        assert_eq!(json["updatedTime"], 7);
        assert!(json.get("updated_time").is_none());
    }
}

//! Index service: the single entry point for building, synchronizing and
//! querying the embedding index.
//!
//! Every public operation holds the store mutex for its whole duration, so
//! operations never interleave. Each operation resolves the embedding
//! provider afresh; if it differs from the one the in-memory index was built
//! with, the index is reloaded from the snapshot or rebuilt first.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::corpus::{CorpusSource, NoteField, NoteMeta, compose_text};
use crate::embeddings::math::cosine_similarity;
use crate::embeddings::{BoxedProvider, EmbeddingProviderType, ProviderSource};
use crate::error::{Error, Result};

use super::cache::{CacheLoad, CacheMiss, IndexCache};
use super::store::{Entry, IndexStore};

/// Notes per corpus page, and per embedding batch during sync.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// What `ensure_current` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refresh {
    Current,
    LoadedCache,
    Rebuilt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReindexOutcome {
    /// A valid snapshot for the current provider was loaded.
    LoadedCache { entries: usize },
    /// The whole corpus was re-embedded.
    Rebuilt { entries: usize, pages: usize },
}

impl ReindexOutcome {
    #[must_use]
    pub const fn entries(&self) -> usize {
        match self {
            Self::LoadedCache { entries } | Self::Rebuilt { entries, .. } => *entries,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
    /// The provider had changed, so the whole index was rebuilt instead.
    Rebuilt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Entries removed because their note no longer exists.
    pub pruned: usize,
    /// Notes re-embedded because they are new or changed.
    pub updated: usize,
    /// Entries in the index afterwards.
    pub total: usize,
    /// The provider had changed, so the index was rebuilt instead of synced.
    pub rebuilt: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEntry {
    pub id: String,
    pub text: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub provider: Option<EmbeddingProviderType>,
    pub entries: usize,
    pub cache_path: PathBuf,
    pub cache_exists: bool,
}

pub struct IndexService<C, P> {
    corpus: C,
    providers: P,
    cache: IndexCache,
    page_size: usize,
    state: Mutex<IndexStore>,
}

impl<C: CorpusSource, P: ProviderSource> IndexService<C, P> {
    /// Create a service with an empty in-memory index. Nothing is loaded
    /// until the first operation.
    pub fn new(corpus: C, providers: P, cache: IndexCache) -> Self {
        Self {
            corpus,
            providers,
            cache,
            page_size: DEFAULT_PAGE_SIZE,
            state: Mutex::new(IndexStore::empty()),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        self.cache.path().to_path_buf()
    }

    /// Load the snapshot for the current provider, or rebuild from the corpus.
    ///
    /// # Errors
    ///
    /// Corpus, provider and snapshot-write failures abort the rebuild; the
    /// previous in-memory index and snapshot stay in place.
    pub async fn reindex_all(&self) -> Result<ReindexOutcome> {
        let mut store = self.state.lock().await;
        let provider = self.providers.current()?;
        self.reindex_locked(&mut store, &provider, true).await
    }

    /// Rebuild from the corpus, ignoring any snapshot.
    ///
    /// # Errors
    ///
    /// Same as [`Self::reindex_all`].
    pub async fn rebuild(&self) -> Result<ReindexOutcome> {
        let mut store = self.state.lock().await;
        let provider = self.providers.current()?;
        self.reindex_locked(&mut store, &provider, false).await
    }

    /// Texts of the `k` entries most similar to `query`, best first.
    ///
    /// # Errors
    ///
    /// Fails if the index has to be rebuilt and that fails, or if the query
    /// cannot be embedded.
    pub async fn query_index(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let scored = self.query_with_scores(query, k).await?;
        Ok(scored.into_iter().map(|s| s.text).collect())
    }

    /// Like [`Self::query_index`], keeping ids and similarity scores.
    ///
    /// # Errors
    ///
    /// Same as [`Self::query_index`].
    pub async fn query_with_scores(&self, query: &str, k: usize) -> Result<Vec<ScoredEntry>> {
        let mut store = self.state.lock().await;
        let provider = self.providers.current()?;
        self.ensure_current(&mut store, &provider).await?;

        if k == 0 || store.is_empty() {
            return Ok(Vec::new());
        }

        let query_vec = provider.embed_one(query).await?;

        // Id-ordered input plus a stable sort keeps ties deterministic
        let mut scored: Vec<ScoredEntry> = store
            .all()
            .into_iter()
            .map(|entry| ScoredEntry {
                score: cosine_similarity(&query_vec, &entry.embedding),
                id: entry.id,
                text: entry.text,
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);

        debug!(k, returned = scored.len(), top = scored.first().map(|s| s.score), "Query scored");
        Ok(scored)
    }

    /// Index or re-index a single note, then persist.
    ///
    /// # Errors
    ///
    /// `Error::NoteNotFound` if the note does not exist; corpus, provider and
    /// snapshot-write failures otherwise.
    pub async fn upsert_note(&self, id: &str) -> Result<UpsertOutcome> {
        let mut store = self.state.lock().await;
        let provider = self.providers.current()?;

        if self.ensure_current(&mut store, &provider).await? == Refresh::Rebuilt {
            debug!(id, "Note covered by rebuild");
            return Ok(UpsertOutcome::Rebuilt);
        }

        let note = self.corpus.get_note(id, NoteField::INDEXED).await?;
        let entry = self
            .embed_notes(&provider, vec![note])
            .await?
            .pop()
            .ok_or_else(|| Error::Embedding(format!("No embedding produced for note {id}")))?;

        let replaced = store.upsert(entry);
        self.cache.save(provider.tag(), &store.all())?;

        let outcome = if replaced {
            UpsertOutcome::Replaced
        } else {
            UpsertOutcome::Inserted
        };
        info!(id, ?outcome, total = store.len(), "Note upserted");
        Ok(outcome)
    }

    /// Reconcile the index with the corpus: prune deleted notes, re-embed new
    /// and changed ones, persist once.
    ///
    /// # Errors
    ///
    /// A failed scan aborts before anything changes. A failure while
    /// re-embedding leaves already-stored notes in memory but does not write
    /// the snapshot; notes not yet stored are picked up by the next sync.
    pub async fn sync_index(&self) -> Result<SyncReport> {
        let mut store = self.state.lock().await;
        let provider = self.providers.current()?;

        if self.ensure_current(&mut store, &provider).await? == Refresh::Rebuilt {
            return Ok(SyncReport {
                total: store.len(),
                rebuilt: true,
                ..SyncReport::default()
            });
        }

        let scanned = self.scan().await?;
        let present: HashSet<&str> = scanned.iter().map(|(id, _)| id.as_str()).collect();

        let mut pruned = 0;
        for id in store.ids() {
            if !present.contains(id.as_str()) && store.remove(&id) {
                pruned += 1;
            }
        }

        let changed: Vec<&str> = scanned
            .iter()
            .filter(|(id, updated_time)| *updated_time > store.last_indexed(id))
            .map(|(id, _)| id.as_str())
            .collect();
        debug!(scanned = scanned.len(), pruned, changed = changed.len(), "Sync scan complete");

        let mut updated = 0;
        for batch in changed.chunks(self.page_size) {
            let mut notes = Vec::with_capacity(batch.len());
            for id in batch {
                match self.corpus.get_note(id, NoteField::INDEXED).await {
                    Ok(note) => notes.push(note),
                    Err(Error::NoteNotFound { .. }) => {
                        debug!(id, "Note deleted during sync");
                        if store.remove(id) {
                            pruned += 1;
                        }
                    }
                    Err(e) => return Err(e),
                }
            }

            for entry in self.embed_notes(&provider, notes).await? {
                store.upsert(entry);
                updated += 1;
            }
        }

        self.cache.save(provider.tag(), &store.all())?;

        let report = SyncReport {
            pruned,
            updated,
            total: store.len(),
            rebuilt: false,
        };
        info!(pruned, updated, total = report.total, "Index synced");
        Ok(report)
    }

    /// Provider, size and snapshot location of the in-memory index.
    pub async fn stats(&self) -> IndexStats {
        let store = self.state.lock().await;
        IndexStats {
            provider: store.provider(),
            entries: store.len(),
            cache_path: self.cache_path(),
            cache_exists: self.cache.exists(),
        }
    }

    /// A stored entry by note id.
    pub async fn entry(&self, id: &str) -> Option<Entry> {
        self.state.lock().await.get(id).cloned()
    }

    // ── internals (caller holds the lock) ─────────────────────

    async fn ensure_current(&self, store: &mut IndexStore, provider: &BoxedProvider) -> Result<Refresh> {
        let tag = provider.tag();
        match store.provider() {
            Some(current) if current == tag => return Ok(Refresh::Current),
            Some(previous) => warn!(from = %previous, to = %tag, "Embedding provider changed, reindexing"),
            None => debug!(provider = %tag, "No index in memory"),
        }

        Ok(match self.reindex_locked(store, provider, true).await? {
            ReindexOutcome::LoadedCache { .. } => Refresh::LoadedCache,
            ReindexOutcome::Rebuilt { .. } => Refresh::Rebuilt,
        })
    }

    async fn reindex_locked(
        &self,
        store: &mut IndexStore,
        provider: &BoxedProvider,
        use_cache: bool,
    ) -> Result<ReindexOutcome> {
        let tag = provider.tag();

        if use_cache {
            match self.cache.load(tag) {
                CacheLoad::Valid(entries) => {
                    let count = entries.len();
                    *store = IndexStore::from_entries(tag, entries);
                    info!(provider = %tag, entries = count, "Loaded index from snapshot");
                    return Ok(ReindexOutcome::LoadedCache { entries: count });
                }
                CacheLoad::Invalid(CacheMiss::Missing) => {
                    info!(path = %self.cache.path().display(), "No snapshot, building index");
                }
                CacheLoad::Invalid(miss) => {
                    warn!(reason = %miss, "Discarding snapshot, building index");
                }
            }
        }

        // Built aside and swapped in only on success
        let mut staging = IndexStore::new(tag);
        let mut page = 1;
        loop {
            let notes = self
                .corpus
                .list_notes(page, self.page_size, NoteField::INDEXED)
                .await?;
            if notes.is_empty() {
                break;
            }

            let count = notes.len();
            for entry in self.embed_notes(provider, notes).await? {
                staging.upsert(entry);
            }
            debug!(page, notes = count, "Embedded page");
            page += 1;
        }
        let pages = page - 1;

        self.cache.save(tag, &staging.all())?;
        let entries = staging.len();
        *store = staging;

        info!(provider = %tag, entries, pages, "Index rebuilt");
        Ok(ReindexOutcome::Rebuilt { entries, pages })
    }

    /// Scan the corpus for `(id, updated_time)` in corpus order.
    async fn scan(&self) -> Result<Vec<(String, i64)>> {
        let mut seen = HashSet::new();
        let mut scanned = Vec::new();
        let mut page = 1;
        loop {
            let notes = self.corpus.list_notes(page, self.page_size, NoteField::SCAN).await?;
            if notes.is_empty() {
                break;
            }
            for note in notes {
                if seen.insert(note.id.clone()) {
                    scanned.push((note.id, note.updated_time));
                }
            }
            page += 1;
        }
        Ok(scanned)
    }

    /// Compose and embed a batch of notes with one provider call.
    async fn embed_notes(&self, provider: &BoxedProvider, notes: Vec<NoteMeta>) -> Result<Vec<Entry>> {
        let folders = self.folder_titles(&notes).await?;

        let texts: Vec<String> = notes
            .iter()
            .map(|note| {
                let folder = folders.get(&note.parent_id).map_or("", String::as_str);
                compose_text(folder, note)
            })
            .collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = provider.embed_many(&refs).await?;

        Ok(notes
            .into_iter()
            .zip(texts)
            .zip(vectors)
            .map(|((note, text), embedding)| Entry {
                id: note.id,
                embedding,
                text,
                updated_time: note.updated_time,
            })
            .collect())
    }

    /// Folder titles for the distinct non-empty parents of `notes`, one lookup each.
    async fn folder_titles(&self, notes: &[NoteMeta]) -> Result<HashMap<String, String>> {
        let mut titles = HashMap::new();
        for note in notes {
            if note.parent_id.is_empty() || titles.contains_key(&note.parent_id) {
                continue;
            }
            let folder = self.corpus.get_folder(&note.parent_id).await?;
            titles.insert(note.parent_id.clone(), folder.title);
        }
        Ok(titles)
    }
}

//! On-disk index snapshot.
//!
//! The snapshot is a single JSON document:
//!
//! ```json
//! { "provider": "ollama", "entries": [ { "id": "...", "embedding": [...], "text": "...", "updatedTime": 0 } ] }
//! ```
//!
//! It is only valid for the provider it names. Loading never fails: every
//! problem is reported as a [`CacheMiss`], which callers answer by rebuilding.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::embeddings::EmbeddingProviderType;
use crate::error::Result;

use super::store::Entry;

#[derive(Debug, Serialize)]
struct SnapshotRef<'a> {
    provider: EmbeddingProviderType,
    entries: &'a [Entry],
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    provider: EmbeddingProviderType,
    entries: Vec<Entry>,
}

/// Why a snapshot could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheMiss {
    Missing,
    Unreadable(String),
    Malformed(String),
    ProviderMismatch {
        found: EmbeddingProviderType,
        expected: EmbeddingProviderType,
    },
}

impl std::fmt::Display for CacheMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "no snapshot on disk"),
            Self::Unreadable(e) => write!(f, "snapshot unreadable: {e}"),
            Self::Malformed(e) => write!(f, "snapshot malformed: {e}"),
            Self::ProviderMismatch { found, expected } => {
                write!(f, "snapshot built with {found}, current provider is {expected}")
            }
        }
    }
}

/// Result of loading the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLoad {
    Valid(Vec<Entry>),
    Invalid(CacheMiss),
}

/// The persisted index snapshot at a fixed path.
#[derive(Debug, Clone)]
pub struct IndexCache {
    path: PathBuf,
}

impl IndexCache {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load entries if the snapshot exists, parses, and was built with `expected`.
    #[must_use]
    pub fn load(&self, expected: EmbeddingProviderType) -> CacheLoad {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return CacheLoad::Invalid(CacheMiss::Missing);
            }
            Err(e) => return CacheLoad::Invalid(CacheMiss::Unreadable(e.to_string())),
        };

        let snapshot: Snapshot = match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => return CacheLoad::Invalid(CacheMiss::Malformed(e.to_string())),
        };

        if snapshot.provider != expected {
            return CacheLoad::Invalid(CacheMiss::ProviderMismatch {
                found: snapshot.provider,
                expected,
            });
        }

        debug!(path = %self.path.display(), entries = snapshot.entries.len(), "Snapshot loaded");
        CacheLoad::Valid(snapshot.entries)
    }

    /// Atomically replace the snapshot.
    ///
    /// Writes `<path>.tmp`, syncs it to disk, then renames it over the
    /// target. On failure the temp file is removed and the previous snapshot
    /// is left as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any file operation fails.
    pub fn save(&self, provider: EmbeddingProviderType, entries: &[Entry]) -> Result<()> {
        let temp_path = self.temp_path();

        let result = self.write_via(&temp_path, provider, entries);
        if result.is_err() {
            if let Err(e) = fs::remove_file(&temp_path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %temp_path.display(), error = %e, "Failed to remove temp snapshot");
                }
            }
        }
        result
    }

    fn write_via(&self, temp_path: &Path, provider: EmbeddingProviderType, entries: &[Entry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        {
            let file = File::create(temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, &SnapshotRef { provider, entries })?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        fs::rename(temp_path, &self.path)?;
        Ok(())
    }

    /// Remove the snapshot. Missing is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries() -> Vec<Entry> {
        vec![
            Entry {
                id: "a".into(),
                embedding: vec![0.6, 0.8],
                text: "Inbox > A\n\nalpha".into(),
                updated_time: 1,
            },
            Entry {
                id: "b".into(),
                embedding: vec![0.0, 0.0],
                text: " > B\n\n".into(),
                updated_time: 2,
            },
        ]
    }

    fn cache_in(temp: &TempDir) -> IndexCache {
        IndexCache::new(temp.path().join("nested").join("index-cache.json"))
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let cache = cache_in(&temp);

        cache.save(EmbeddingProviderType::Ollama, &entries()).unwrap();

        assert!(cache.exists());
        assert_eq!(cache.load(EmbeddingProviderType::Ollama), CacheLoad::Valid(entries()));
        assert!(!cache.temp_path().exists());
    }

    #[test]
    fn test_missing_snapshot() {
        let temp = TempDir::new().unwrap();
        assert_eq!(
            cache_in(&temp).load(EmbeddingProviderType::Ollama),
            CacheLoad::Invalid(CacheMiss::Missing)
        );
    }

    #[test]
    fn test_provider_mismatch() {
        let temp = TempDir::new().unwrap();
        let cache = cache_in(&temp);
        cache.save(EmbeddingProviderType::Openai, &entries()).unwrap();

        assert_eq!(
            cache.load(EmbeddingProviderType::Ollama),
            CacheLoad::Invalid(CacheMiss::ProviderMismatch {
                found: EmbeddingProviderType::Openai,
                expected: EmbeddingProviderType::Ollama,
            })
        );
    }

    #[test]
    fn test_malformed_snapshots() {
        let temp = TempDir::new().unwrap();
        let cache = IndexCache::new(temp.path().join("index-cache.json"));

        for content in [
            "not json",
            r#"{"entries": []}"#,
            r#"{"provider": "huggingface", "entries": []}"#,
            r#"{"provider": "ollama", "entries": [{"id": "a"}]}"#,
        ] {
            fs::write(cache.path(), content).unwrap();
            assert!(
                matches!(cache.load(EmbeddingProviderType::Ollama), CacheLoad::Invalid(CacheMiss::Malformed(_))),
                "{content}"
            );
        }
    }

    #[test]
    fn test_snapshot_wire_format() {
        let temp = TempDir::new().unwrap();
        let cache = cache_in(&temp);
        cache.save(EmbeddingProviderType::Openai, &entries()).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(cache.path()).unwrap()).unwrap();
        assert_eq!(raw["provider"], "openai");
        assert_eq!(raw["entries"][0]["updatedTime"], 1);
        assert_eq!(raw["entries"][1]["id"], "b");
    }

    #[test]
    fn test_failed_save_keeps_previous_snapshot() {
        let temp = TempDir::new().unwrap();
        let cache = IndexCache::new(temp.path().join("index-cache.json"));
        cache.save(EmbeddingProviderType::Ollama, &entries()).unwrap();

        // A directory squatting on the temp path makes File::create fail
        fs::create_dir(cache.temp_path()).unwrap();
        assert!(cache.save(EmbeddingProviderType::Ollama, &[]).is_err());

        assert_eq!(cache.load(EmbeddingProviderType::Ollama), CacheLoad::Valid(entries()));
    }

    #[test]
    fn test_delete() {
        let temp = TempDir::new().unwrap();
        let cache = cache_in(&temp);
        cache.delete().unwrap();

        cache.save(EmbeddingProviderType::Ollama, &[]).unwrap();
        cache.delete().unwrap();
        assert!(!cache.exists());
    }
}

//! Configuration management.
//!
//! NoteChat keeps everything under one data directory:
//!
//! - `config.json` - embedding, Joplin and paging settings (all optional)
//! - `index-cache.json` - the persisted index snapshot
//!
//! Environment variables override the file for individual settings; see
//! [`crate::embeddings::config`] and [`crate::corpus::joplin`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::corpus::JoplinSettings;
use crate::embeddings::EmbeddingSettings;
use crate::error::{Error, Result};
use crate::index::DEFAULT_PAGE_SIZE;

pub const CONFIG_FILE: &str = "config.json";
pub const CACHE_FILE: &str = "index-cache.json";

/// Contents of `<data_dir>/config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteChatConfig {
    pub embeddings: EmbeddingSettings,
    pub joplin: JoplinSettings,
    pub page_size: Option<usize>,
}

impl NoteChatConfig {
    /// Notes per corpus page and per embedding batch.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size.filter(|n| *n > 0).unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// Read a non-empty environment variable.
#[must_use]
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get the default data directory (`~/.notechat`).
#[must_use]
pub fn default_data_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".notechat"))
}

/// Resolve the data directory.
///
/// Priority:
/// 1. `explicit` (the `--data-dir` flag, which clap also fills from `NOTECHAT_DATA_DIR`)
/// 2. `NOTECHAT_DATA_DIR` environment variable
/// 3. `~/.notechat`
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(dir) = env_var("NOTECHAT_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }

    default_data_dir().ok_or_else(|| Error::Config("Could not determine home directory".into()))
}

/// Path of the config file inside a data directory.
#[must_use]
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Path of the index snapshot inside a data directory.
#[must_use]
pub fn cache_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CACHE_FILE)
}

/// Load the configuration file. A missing file yields defaults.
pub fn load_config(path: &Path) -> Result<NoteChatConfig> {
    if !path.exists() {
        return Ok(NoteChatConfig::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

    if content.trim().is_empty() {
        return Ok(NoteChatConfig::default());
    }

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, NoteChatConfig::default());
        assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_load_full_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"{
                "embeddings": {"openai_api_key": "sk-x", "use_local_model": true},
                "joplin": {"endpoint": "http://joplin:41184", "token": "t"},
                "page_size": 20
            }"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.embeddings.openai_api_key.as_deref(), Some("sk-x"));
        assert_eq!(config.embeddings.use_local_model, Some(true));
        assert_eq!(config.joplin.token.as_deref(), Some("t"));
        assert_eq!(config.page_size(), 20);
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, r#"{"page_size": "lots"}"#).unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.exit_code(), 7);
    }

    #[test]
    fn test_zero_page_size_falls_back() {
        let config = NoteChatConfig {
            page_size: Some(0),
            ..NoteChatConfig::default()
        };
        assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let dir = PathBuf::from("/tmp/notechat-explicit");
        assert_eq!(resolve_data_dir(Some(&dir)).unwrap(), dir);
        assert_eq!(cache_path(&dir), dir.join("index-cache.json"));
        assert_eq!(config_path(&dir), dir.join("config.json"));
    }
}

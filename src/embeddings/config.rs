//! Embedding configuration resolution.
//!
//! Settings come from the `embeddings` section of `<data_dir>/config.json`,
//! with environment variables taking precedence:
//!
//! - `OPENAI_API_KEY` - enables the remote provider
//! - `NOTECHAT_USE_LOCAL_MODEL` - force Ollama even when a key is set
//! - `OLLAMA_ENDPOINT` / `OLLAMA_MODEL`
//! - `OPENAI_ENDPOINT` / `OPENAI_MODEL`

use super::types::{EmbeddingProviderType, EmbeddingSettings};

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "all-minilm:22m-l6-v2-fp16";
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";

/// Fully resolved embedding configuration for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingConfig {
    pub openai_api_key: Option<String>,
    pub use_local_model: bool,
    pub ollama_endpoint: String,
    pub ollama_model: String,
    pub openai_endpoint: String,
    pub openai_model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::resolve(&EmbeddingSettings::default(), |_| None)
    }
}

impl EmbeddingConfig {
    /// Resolve from file settings and an environment lookup.
    ///
    /// Priority: env var > config file > default. Empty values count as unset.
    pub fn resolve(settings: &EmbeddingSettings, env: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |var: &str, file: Option<&String>| {
            env(var)
                .filter(|v| !v.is_empty())
                .or_else(|| file.filter(|v| !v.is_empty()).cloned())
        };

        let use_local_model = env("NOTECHAT_USE_LOCAL_MODEL")
            .filter(|v| !v.is_empty())
            .map_or(settings.use_local_model.unwrap_or(false), |v| is_truthy(&v));

        Self {
            openai_api_key: pick("OPENAI_API_KEY", settings.openai_api_key.as_ref()),
            use_local_model,
            ollama_endpoint: pick("OLLAMA_ENDPOINT", settings.ollama_endpoint.as_ref())
                .unwrap_or_else(|| DEFAULT_OLLAMA_ENDPOINT.to_string()),
            ollama_model: pick("OLLAMA_MODEL", settings.ollama_model.as_ref())
                .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            openai_endpoint: pick("OPENAI_ENDPOINT", settings.openai_endpoint.as_ref())
                .unwrap_or_else(|| DEFAULT_OPENAI_ENDPOINT.to_string()),
            openai_model: pick("OPENAI_MODEL", settings.openai_model.as_ref())
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        }
    }

    /// Which provider this configuration selects.
    ///
    /// Remote only when an API key is present and the local override is off.
    #[must_use]
    pub fn selected(&self) -> EmbeddingProviderType {
        if self.openai_api_key.is_some() && !self.use_local_model {
            EmbeddingProviderType::Openai
        } else {
            EmbeddingProviderType::Ollama
        }
    }
}

/// Parse a boolean-ish environment value. `0`, `false`, `no` and `off` are false.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_select_local() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.ollama_endpoint, DEFAULT_OLLAMA_ENDPOINT);
        assert_eq!(config.ollama_model, "all-minilm:22m-l6-v2-fp16");
        assert_eq!(config.selected(), EmbeddingProviderType::Ollama);
    }

    #[test]
    fn test_api_key_selects_remote() {
        let config = EmbeddingConfig::resolve(
            &EmbeddingSettings::default(),
            env_from(&[("OPENAI_API_KEY", "sk-test")]),
        );
        assert_eq!(config.selected(), EmbeddingProviderType::Openai);
    }

    #[test]
    fn test_local_override_wins_over_key() {
        let settings = EmbeddingSettings {
            openai_api_key: Some("sk-file".into()),
            use_local_model: Some(true),
            ..EmbeddingSettings::default()
        };
        let config = EmbeddingConfig::resolve(&settings, |_| None);
        assert_eq!(config.selected(), EmbeddingProviderType::Ollama);

        // env can switch the override back off
        let config = EmbeddingConfig::resolve(&settings, env_from(&[("NOTECHAT_USE_LOCAL_MODEL", "0")]));
        assert_eq!(config.selected(), EmbeddingProviderType::Openai);
    }

    #[test]
    fn test_env_beats_file_and_empty_is_unset() {
        let settings = EmbeddingSettings {
            ollama_model: Some("nomic-embed-text".into()),
            openai_api_key: Some(String::new()),
            ..EmbeddingSettings::default()
        };
        let config = EmbeddingConfig::resolve(&settings, env_from(&[("OLLAMA_MODEL", "mxbai-embed-large")]));
        assert_eq!(config.ollama_model, "mxbai-embed-large");
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.selected(), EmbeddingProviderType::Ollama);
    }

    #[test]
    fn test_is_truthy() {
        for v in ["1", "true", "YES", "on"] {
            assert!(is_truthy(v), "{v}");
        }
        for v in ["0", "false", "FALSE", "off", ""] {
            assert!(!is_truthy(v), "{v}");
        }
    }
}

//! Embedding types and configuration.
//!
//! `EmbeddingSettings` is the `embeddings` section of `<data_dir>/config.json`.

use serde::{Deserialize, Serialize};

/// Embedding provider types.
///
/// Doubles as the provider tag written into the index snapshot: vectors
/// produced by different providers are never compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderType {
    /// Local Ollama server.
    Ollama,
    /// Remote OpenAI embeddings API.
    Openai,
}

impl std::fmt::Display for EmbeddingProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::Openai => write!(f, "openai"),
        }
    }
}

/// Embedding settings stored in `<data_dir>/config.json`.
///
/// Every field is optional; environment variables take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub openai_api_key: Option<String>,
    pub use_local_model: Option<bool>,
    pub ollama_endpoint: Option<String>,
    pub ollama_model: Option<String>,
    pub openai_endpoint: Option<String>,
    pub openai_model: Option<String>,
}

/// Provider metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub provider: EmbeddingProviderType,
    pub model: String,
    pub dimensions: usize,
}

/// Output dimensions of known Ollama models.
pub mod ollama_models {
    /// Unknown models are assumed to be 768-dimensional.
    #[must_use]
    pub fn dimensions(model: &str) -> usize {
        // Ollama accepts an optional `:tag` suffix
        let base = model.split(':').next().unwrap_or(model);
        match base {
            "all-minilm" => 384,
            "mxbai-embed-large" => 1024,
            _ => 768,
        }
    }
}

/// Output dimensions of known OpenAI models.
pub mod openai_models {
    #[must_use]
    pub fn dimensions(model: &str) -> usize {
        match model {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_tag_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&EmbeddingProviderType::Ollama).unwrap(), "\"ollama\"");
        assert_eq!(serde_json::to_string(&EmbeddingProviderType::Openai).unwrap(), "\"openai\"");
        assert!(serde_json::from_str::<EmbeddingProviderType>("\"huggingface\"").is_err());
    }

    #[test]
    fn test_ollama_model_tag_suffix() {
        assert_eq!(ollama_models::dimensions("all-minilm:22m-l6-v2-fp16"), 384);
        assert_eq!(ollama_models::dimensions("mxbai-embed-large"), 1024);
        assert_eq!(ollama_models::dimensions("nomic-embed-text:latest"), 768);
    }

    #[test]
    fn test_openai_model_dimensions() {
        assert_eq!(openai_models::dimensions("text-embedding-3-large"), 3072);
        assert_eq!(openai_models::dimensions("text-embedding-ada-002"), 1536);
    }

    #[test]
    fn test_settings_partial_json() {
        let settings: EmbeddingSettings =
            serde_json::from_str(r#"{"use_local_model": true}"#).unwrap();
        assert_eq!(settings.use_local_model, Some(true));
        assert!(settings.openai_api_key.is_none());
    }
}

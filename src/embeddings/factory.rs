//! Embedding provider factory.
//!
//! Handles provider selection, creation, and detection.

use std::path::PathBuf;

use crate::config::{env_var, load_config};
use crate::error::Result;

use super::config::EmbeddingConfig;
use super::ollama::OllamaProvider;
use super::openai::OpenAiProvider;
use super::provider::{BoxedProvider, EmbeddingProvider};
use super::types::EmbeddingProviderType;

/// Yields the provider that should serve the next operation.
///
/// Called at the start of every index operation, so a configuration change
/// takes effect without restarting.
pub trait ProviderSource: Send + Sync {
    fn current(&self) -> Result<BoxedProvider>;
}

/// Production provider source: re-reads `config.json` plus the environment
/// on every call.
#[derive(Debug, Clone)]
pub struct ConfiguredProviders {
    config_path: PathBuf,
}

impl ConfiguredProviders {
    #[must_use]
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Resolve the embedding configuration as of now.
    pub fn resolve(&self) -> Result<EmbeddingConfig> {
        let config = load_config(&self.config_path)?;
        Ok(EmbeddingConfig::resolve(&config.embeddings, env_var))
    }
}

impl ProviderSource for ConfiguredProviders {
    fn current(&self) -> Result<BoxedProvider> {
        let config = self.resolve()?;
        let provider = create_provider(&config);
        tracing::debug!(
            provider = %provider.tag(),
            model = %provider.info().model,
            "Resolved embedding provider"
        );
        Ok(provider)
    }
}

/// Create the provider a resolved configuration selects.
#[must_use]
pub fn create_provider(config: &EmbeddingConfig) -> BoxedProvider {
    match (config.selected(), config.openai_api_key.as_deref()) {
        (EmbeddingProviderType::Openai, Some(key)) => BoxedProvider::new(OpenAiProvider::with_config(
            &config.openai_endpoint,
            &config.openai_model,
            key,
        )),
        _ => BoxedProvider::new(OllamaProvider::with_config(
            &config.ollama_endpoint,
            &config.ollama_model,
        )),
    }
}

/// Available provider detection result.
#[derive(Debug, Clone)]
pub struct ProviderDetection {
    /// Providers that are reachable (Ollama) or configured (OpenAI).
    pub available: Vec<EmbeddingProviderType>,
    /// The provider the configuration selects.
    pub selected: EmbeddingProviderType,
}

/// Detect which embedding providers are available.
pub async fn detect_available_providers(config: &EmbeddingConfig) -> ProviderDetection {
    let mut available = Vec::new();

    let ollama = OllamaProvider::with_config(&config.ollama_endpoint, &config.ollama_model);
    if ollama.is_available().await {
        available.push(EmbeddingProviderType::Ollama);
    }

    if let Some(key) = config.openai_api_key.as_deref() {
        let openai = OpenAiProvider::with_config(&config.openai_endpoint, &config.openai_model, key);
        if openai.is_available().await {
            available.push(EmbeddingProviderType::Openai);
        }
    }

    ProviderDetection {
        available,
        selected: config.selected(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_provider_follows_selection() {
        let mut config = EmbeddingConfig::default();
        assert_eq!(create_provider(&config).tag(), EmbeddingProviderType::Ollama);

        config.openai_api_key = Some("sk-test".into());
        assert_eq!(create_provider(&config).tag(), EmbeddingProviderType::Openai);

        config.use_local_model = true;
        assert_eq!(create_provider(&config).tag(), EmbeddingProviderType::Ollama);
    }

    #[test]
    fn test_configured_providers_rereads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        let source = ConfiguredProviders::new(path.clone());

        let before = source.resolve().unwrap();

        std::fs::write(&path, r#"{"embeddings": {"ollama_model": "nomic-embed-text"}}"#).unwrap();
        let after = source.resolve().unwrap();

        // OLLAMA_MODEL in the environment would shadow the file
        if std::env::var("OLLAMA_MODEL").is_err() {
            assert_eq!(before.ollama_model, "all-minilm:22m-l6-v2-fp16");
            assert_eq!(after.ollama_model, "nomic-embed-text");
        }
    }

    #[test]
    fn test_configured_providers_bad_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let source = ConfiguredProviders::new(path);
        assert!(source.current().is_err());
    }
}

//! Ollama embedding provider.
//!
//! Uses a local Ollama server for embedding generation. Selected whenever no
//! OpenAI key is configured, or when the local override is set.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

use super::provider::EmbeddingProvider;
use super::types::{EmbeddingProviderType, ProviderInfo, ollama_models};

/// Ollama embedding provider.
pub struct OllamaProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    dimensions: usize,
}

impl OllamaProvider {
    /// Create a new Ollama provider for a specific endpoint and model.
    #[must_use]
    pub fn with_config(endpoint: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions: ollama_models::dimensions(model),
        }
    }

    async fn embed(&self, input: EmbedInput<'_>) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.endpoint);

        let request = OllamaEmbedRequest {
            model: &self.model,
            input,
            truncate: true,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Ollama request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "Ollama embedding failed ({status}): {error}"
            )));
        }

        let data: OllamaEmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse Ollama response: {e}")))?;

        Ok(data.embeddings)
    }
}

/// Ollama API response for listing models.
#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Option<Vec<OllamaModel>>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}

/// Ollama API request for embedding.
#[derive(Debug, Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: EmbedInput<'a>,
    truncate: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum EmbedInput<'a> {
    Single(&'a str),
    Batch(&'a [&'a str]),
}

/// Ollama API response for embedding.
#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl EmbeddingProvider for OllamaProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            provider: EmbeddingProviderType::Ollama,
            model: self.model.clone(),
            dimensions: self.dimensions,
        }
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.endpoint);

        let Ok(response) = self
            .client
            .get(&url)
            .timeout(std::time::Duration::from_secs(2))
            .send()
            .await
        else {
            return false;
        };

        if !response.status().is_success() {
            return false;
        }

        let Ok(data) = response.json::<OllamaTagsResponse>().await else {
            return false;
        };

        // Pulled models carry a `:tag` suffix
        data.models.is_some_and(|models| {
            models
                .iter()
                .any(|m| m.name == self.model || m.name.starts_with(&format!("{}:", self.model)))
        })
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(EmbedInput::Single(text))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("No embeddings returned from Ollama".into()))
    }

    async fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.embed(EmbedInput::Batch(texts)).await
    }
}

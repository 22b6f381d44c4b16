//! OpenAI embeddings API provider.
//!
//! Uses the hosted `/embeddings` endpoint. Requires an API key
//! (`OPENAI_API_KEY` or `embeddings.openai_api_key` in config.json).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

use super::provider::EmbeddingProvider;
use super::types::{EmbeddingProviderType, ProviderInfo, openai_models};

/// OpenAI embeddings API provider.
pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    dimensions: usize,
}

impl OpenAiProvider {
    /// Create a provider for a specific endpoint and model.
    #[must_use]
    pub fn with_config(endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            dimensions: openai_models::dimensions(model),
        }
    }

    async fn embed(&self, input: EmbedInput<'_>) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.endpoint);

        let request = OpenAiEmbedRequest {
            model: &self.model,
            input,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("OpenAI request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!("OpenAI API error ({status}): {error}")));
        }

        let data: OpenAiEmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse OpenAI response: {e}")))?;

        Ok(data.into_ordered())
    }
}

/// OpenAI API request for embeddings.
#[derive(Debug, Serialize)]
struct OpenAiEmbedRequest<'a> {
    model: &'a str,
    input: EmbedInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum EmbedInput<'a> {
    Single(&'a str),
    Batch(&'a [&'a str]),
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbedding {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedResponse {
    /// Embeddings in input order. The API tags each item with its input index.
    fn into_ordered(mut self) -> Vec<Vec<f32>> {
        self.data.sort_by_key(|d| d.index);
        self.data.into_iter().map(|d| d.embedding).collect()
    }
}

impl EmbeddingProvider for OpenAiProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            provider: EmbeddingProviderType::Openai,
            model: self.model.clone(),
            dimensions: self.dimensions,
        }
    }

    async fn is_available(&self) -> bool {
        // Pinging the API would spend quota
        !self.api_key.is_empty()
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(EmbedInput::Single(text))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("No embeddings in OpenAI response".into()))
    }

    async fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.embed(EmbedInput::Batch(texts)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::config::{DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_MODEL};

    fn public_api(key: &str) -> OpenAiProvider {
        OpenAiProvider::with_config(DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_MODEL, key)
    }

    #[test]
    fn test_openai_provider_defaults() {
        let provider = public_api("sk-test");
        let info = provider.info();
        assert_eq!(info.provider, EmbeddingProviderType::Openai);
        assert_eq!(info.model, "text-embedding-3-small");
        assert_eq!(info.dimensions, 1536);
        assert_eq!(provider.endpoint, "https://api.openai.com/v1");
    }

    #[test]
    fn test_openai_provider_custom_model() {
        let provider = OpenAiProvider::with_config("http://proxy/v1/", "text-embedding-3-large", "k");
        assert_eq!(provider.endpoint, "http://proxy/v1");
        assert_eq!(provider.info().dimensions, 3072);
    }

    #[test]
    fn test_response_reordered_by_index() {
        let body = r#"{"object":"list","data":[
            {"object":"embedding","index":1,"embedding":[0.0,1.0]},
            {"object":"embedding","index":0,"embedding":[1.0,0.0]}
        ],"model":"text-embedding-3-small"}"#;
        let parsed: OpenAiEmbedResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.into_ordered(), vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_empty_key_is_unavailable() {
        assert!(public_api("sk-test").is_available().await);
        assert!(!public_api("").is_available().await);
    }
}

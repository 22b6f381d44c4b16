//! Embedding provider trait.
//!
//! Defines the interface that all embedding backends implement, and the
//! boxed adapter the index talks to. The adapter owns the uniform contract:
//! inputs are truncated to [`MAX_EMBED_CHARS`] and every returned vector is
//! unit-normalized, whichever backend produced it.

use std::future::Future;
use std::pin::Pin;

use crate::error::{Error, Result};

use super::math::normalize;
use super::types::{EmbeddingProviderType, ProviderInfo};

/// Maximum characters (Unicode scalar values) sent to a backend per text.
pub const MAX_EMBED_CHARS: usize = 2000;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for embedding providers.
///
/// Implemented by the Ollama and OpenAI backends.
pub trait EmbeddingProvider: Send + Sync {
    /// Get provider metadata.
    fn info(&self) -> ProviderInfo;

    /// Check if the provider is available.
    ///
    /// For Ollama, this checks if the server is running and the model is pulled.
    /// For OpenAI, this checks that an API key is configured.
    fn is_available(&self) -> impl Future<Output = bool> + Send;

    /// Generate embedding for a single text.
    fn generate_embedding(&self, text: &str) -> impl Future<Output = Result<Vec<f32>>> + Send;

    /// Generate embeddings for multiple texts (batch).
    ///
    /// Default implementation calls `generate_embedding` for each text.
    fn generate_embeddings(&self, texts: &[&str]) -> impl Future<Output = Result<Vec<Vec<f32>>>> + Send {
        async move {
            let mut results = Vec::with_capacity(texts.len());
            for text in texts {
                results.push(self.generate_embedding(text).await?);
            }
            Ok(results)
        }
    }
}

/// Truncate `text` to at most `max` Unicode scalar values.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Boxed provider for dynamic dispatch.
///
/// Since the trait has async methods with `impl Future`, we need this wrapper
/// for runtime polymorphism.
pub struct BoxedProvider {
    inner: Box<dyn EmbeddingProviderBoxed + Send + Sync>,
}

/// Object-safe version of EmbeddingProvider for boxing.
pub trait EmbeddingProviderBoxed: Send + Sync {
    fn info(&self) -> ProviderInfo;
    fn is_available_boxed(&self) -> BoxFuture<'_, bool>;
    fn generate_embedding_boxed(&self, text: &str) -> BoxFuture<'_, Result<Vec<f32>>>;
    fn generate_embeddings_boxed(&self, texts: &[&str]) -> BoxFuture<'_, Result<Vec<Vec<f32>>>>;
}

impl BoxedProvider {
    /// Create a new boxed provider.
    pub fn new<P: EmbeddingProvider + 'static>(provider: P) -> Self {
        Self {
            inner: Box::new(BoxedProviderWrapper(provider)),
        }
    }

    /// Get provider metadata.
    #[must_use]
    pub fn info(&self) -> ProviderInfo {
        self.inner.info()
    }

    /// The tag recorded alongside every vector this provider produces.
    #[must_use]
    pub fn tag(&self) -> EmbeddingProviderType {
        self.inner.info().provider
    }

    /// Check if the provider is available.
    pub async fn is_available(&self) -> bool {
        self.inner.is_available_boxed().await
    }

    /// Embed one text: truncated, then normalized.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let raw = self
            .inner
            .generate_embedding_boxed(truncate_chars(text, MAX_EMBED_CHARS))
            .await?;
        Ok(normalize(&raw))
    }

    /// Embed a batch, preserving input order.
    ///
    /// An empty batch returns immediately without contacting the backend.
    pub async fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let truncated: Vec<&str> = texts
            .iter()
            .map(|t| truncate_chars(t, MAX_EMBED_CHARS))
            .collect();
        let raw = self.inner.generate_embeddings_boxed(&truncated).await?;

        if raw.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "{} returned {} embeddings for {} inputs",
                self.tag(),
                raw.len(),
                texts.len()
            )));
        }

        Ok(raw.iter().map(|v| normalize(v)).collect())
    }
}

impl std::fmt::Debug for BoxedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedProvider").field("info", &self.info()).finish()
    }
}

/// Wrapper to implement EmbeddingProviderBoxed for any EmbeddingProvider.
struct BoxedProviderWrapper<P: EmbeddingProvider + 'static>(P);

impl<P: EmbeddingProvider + 'static> EmbeddingProviderBoxed for BoxedProviderWrapper<P> {
    fn info(&self) -> ProviderInfo {
        self.0.info()
    }

    fn is_available_boxed(&self) -> BoxFuture<'_, bool> {
        Box::pin(self.0.is_available())
    }

    fn generate_embedding_boxed(&self, text: &str) -> BoxFuture<'_, Result<Vec<f32>>> {
        // Owned copy so the future does not borrow the caller's slice
        let text_owned = text.to_string();
        Box::pin(async move { self.0.generate_embedding(&text_owned).await })
    }

    fn generate_embeddings_boxed(&self, texts: &[&str]) -> BoxFuture<'_, Result<Vec<Vec<f32>>>> {
        let texts_owned: Vec<String> = texts.iter().map(|s| (*s).to_string()).collect();
        Box::pin(async move {
            let refs: Vec<&str> = texts_owned.iter().map(String::as_str).collect();
            self.0.generate_embeddings(&refs).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records what it was asked to embed and returns `[len, 0, ...]` vectors.
    #[derive(Clone, Default)]
    struct Recording {
        seen: Arc<Mutex<Vec<String>>>,
        drop_last: bool,
    }

    impl EmbeddingProvider for Recording {
        fn info(&self) -> ProviderInfo {
            ProviderInfo {
                provider: EmbeddingProviderType::Ollama,
                model: "recording".into(),
                dimensions: 3,
            }
        }

        async fn is_available(&self) -> bool {
            true
        }

        #[allow(clippy::cast_precision_loss)]
        async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
            self.seen.lock().unwrap().push(text.to_string());
            Ok(vec![text.chars().count() as f32, 0.0, 0.0])
        }

        async fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for text in texts {
                out.push(self.generate_embedding(text).await?);
            }
            if self.drop_last {
                out.pop();
            }
            Ok(out)
        }
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[tokio::test]
    async fn test_embed_one_truncates_and_normalizes() {
        let recording = Recording::default();
        let provider = BoxedProvider::new(recording.clone());

        let long = "ä".repeat(MAX_EMBED_CHARS + 50);
        let v = provider.embed_one(&long).await.unwrap();

        assert_eq!(v, vec![1.0, 0.0, 0.0]);
        let seen = recording.seen.lock().unwrap();
        assert_eq!(seen[0].chars().count(), MAX_EMBED_CHARS);
    }

    #[tokio::test]
    async fn test_embed_many_empty_skips_backend() {
        let recording = Recording::default();
        let provider = BoxedProvider::new(recording.clone());

        let out = provider.embed_many(&[]).await.unwrap();
        assert!(out.is_empty());
        assert!(recording.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_embed_many_preserves_order() {
        let recording = Recording::default();
        let provider = BoxedProvider::new(recording.clone());

        let out = provider.embed_many(&["a", "bb", "ccc"]).await.unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(*recording.seen.lock().unwrap(), vec!["a", "bb", "ccc"]);
    }

    #[tokio::test]
    async fn test_embed_many_count_mismatch_is_error() {
        let provider = BoxedProvider::new(Recording {
            drop_last: true,
            ..Recording::default()
        });

        let err = provider.embed_many(&["a", "b"]).await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }
}

//! Embedding module for semantic retrieval.
//!
//! Provides embedding generation using HTTP-based providers:
//! - **Ollama** (local) - used by default
//! - **OpenAI** (remote) - used when an API key is configured
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   IndexService   │
//! └────────┬─────────┘
//!          │ current()
//!          ▼
//! ┌─────────────────┐
//! │ ProviderSource  │  ← re-reads config.json + env per operation
//! └────────┬────────┘
//!          │
//!     ┌────┴────┐
//!     ▼         ▼
//! ┌───────┐ ┌────────┐
//! │Ollama │ │ OpenAI │
//! └───────┘ └────────┘
//!     │         │
//!     ▼         ▼
//!   HTTP      HTTP
//! localhost   API
//! ```
//!
//! Every vector handed to the index passes through [`BoxedProvider`], which
//! truncates inputs and unit-normalizes outputs.

pub mod config;
pub mod factory;
pub mod math;
pub mod ollama;
pub mod openai;
pub mod provider;
pub mod types;

pub use config::EmbeddingConfig;
pub use factory::{
    ConfiguredProviders, ProviderDetection, ProviderSource, create_provider,
    detect_available_providers,
};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use provider::{BoxedProvider, EmbeddingProvider, MAX_EMBED_CHARS};
pub use types::{EmbeddingProviderType, EmbeddingSettings, ProviderInfo};

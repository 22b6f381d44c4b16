//! Error types for NoteChat.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=corpus, 3=not_found, 9=embedding, etc.)
//! - Retryability flags for transient failures
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Cache misses are not errors: see [`crate::index::CacheLoad`].

use thiserror::Error;

/// Result type alias for NoteChat operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Corpus (exit 2)
    CorpusError,

    // Not Found (exit 3)
    NoteNotFound,

    // Validation (exit 4)
    InvalidArgument,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Embedding (exit 9)
    EmbeddingError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::CorpusError => "CORPUS_ERROR",
            Self::NoteNotFound => "NOTE_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::EmbeddingError => "EMBEDDING_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-9).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::CorpusError => 2,
            Self::NoteNotFound => 3,
            Self::InvalidArgument => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
            Self::EmbeddingError => 9,
        }
    }

    /// Whether the failed operation can simply be retried.
    ///
    /// Corpus and provider failures are usually a server that is not up yet;
    /// a retried sync re-attempts only the notes that were not stored.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::CorpusError | Self::EmbeddingError)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in NoteChat operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Note not found: {id}")]
    NoteNotFound { id: String },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Corpus(_) => ErrorCode::CorpusError,
            Self::NoteNotFound { .. } => ErrorCode::NoteNotFound,
            Self::Embedding(_) => ErrorCode::EmbeddingError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Corpus(_) => Some(
                "Is Joplin running with the Web Clipper service enabled?\n  \
                 Set JOPLIN_TOKEN (Options > Web Clipper > Advanced) or `joplin.token` in config.json"
                    .to_string(),
            ),

            Self::NoteNotFound { id } => Some(format!(
                "No note with ID '{id}'. It may have been deleted; run `notechat sync` to prune it."
            )),

            Self::Embedding(msg) => {
                if msg.contains("401") || msg.contains("Unauthorized") {
                    Some("Check OPENAI_API_KEY, or set NOTECHAT_USE_LOCAL_MODEL=1 to use Ollama".to_string())
                } else {
                    Some(
                        "Start Ollama (https://ollama.ai) and pull the embedding model, \
                         or set OPENAI_API_KEY to use the remote provider"
                            .to_string(),
                    )
                }
            }

            Self::Config(_) => {
                Some("Fix or remove config.json in the data directory (see `notechat status`)".to_string())
            }

            Self::InvalidArgument(_) | Self::Io(_) | Self::Json(_) | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

//! Error types for the `medqa-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while answering a question over a corpus.
#[derive(Debug, Error)]
pub enum RagError {
    /// The corpus produced zero chunks after cleaning and splitting.
    #[error("corpus is empty: no chunks could be produced from the input text")]
    EmptyCorpus,

    /// A vector had the wrong length, or vector and payload counts disagreed.
    #[error("dimension mismatch ({what}): expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being measured (e.g. "vector length", "entry count").
        what: &'static str,
        /// The expected value.
        expected: usize,
        /// The value actually observed.
        actual: usize,
    },

    /// The embedding backend returned no usable vector.
    #[error("embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The generation backend refused the request transiently.
    ///
    /// Callers should back off and retry; [`RetryingGenerator`](crate::retry::RetryingGenerator)
    /// is the only place in the system that does so.
    #[error("generation rate limited: {0}")]
    RateLimited(String),

    /// The generation backend failed for a non-transient reason.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// All generation attempts were consumed by rate limiting.
    #[error("generation failed after {attempts} rate-limited attempts")]
    RetriesExhausted {
        /// How many attempts were made before giving up.
        attempts: usize,
    },

    /// A passage source (e.g. a literature search) failed.
    #[error("passage source error ({provider}): {message}")]
    Source {
        /// The passage source that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The corpus file has an extension the loader does not understand.
    #[error("unsupported corpus format: {0} (use .txt or .json)")]
    UnsupportedFormat(String),

    /// The corpus file does not exist.
    #[error("corpus not found: {0}")]
    NotFound(PathBuf),

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O failure while reading corpus files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;

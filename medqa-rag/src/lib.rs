//! # medqa-rag
//!
//! Retrieval-augmented question answering over clinical notes, structured
//! patient records, and literature abstracts.
//!
//! The crate is a small orchestration engine: deterministic text chunking, an
//! exact in-memory vector index, and a generation step with bounded retry
//! under rate limiting. The embedding and generation models are external
//! collaborators behind the [`EmbeddingProvider`] and [`GenerationProvider`]
//! traits, with Gemini adapters shipped in [`gemini`].
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use medqa_rag::{RagConfig, RagPipeline};
//! use medqa_rag::gemini::{GeminiEmbedder, GeminiGenerator};
//!
//! let api_key = std::env::var("GEMINI_API_KEY")?;
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(GeminiEmbedder::new(&api_key)?))
//!     .generation_provider(Arc::new(GeminiGenerator::new(&api_key)?))
//!     .build()?;
//!
//! let note = medqa_rag::load_corpus("note.txt")?;
//! let answer = pipeline.run(&note, "Why was the patient prescribed an antibiotic?").await?;
//! println!("{answer}");
//! ```
//!
//! ## Design notes
//!
//! - Each pipeline run owns its own [`VectorIndex`]; nothing persists across
//!   runs and concurrent runs need no coordination.
//! - Retry policy lives exclusively in [`retry::RetryingGenerator`]: at most
//!   three generation attempts with a fixed backoff, and only for rate
//!   limiting. Embedding and indexing errors are structural and always fatal.

pub mod chunking;
pub mod config;
pub mod embedding;
pub mod error;
pub mod gemini;
pub mod generation;
pub mod index;
pub mod loader;
pub mod pipeline;
pub mod retry;
pub mod source;

pub use chunking::{chunk_text, clean_text};
pub use config::{RagConfig, RagConfigBuilder};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generation::GenerationProvider;
pub use index::VectorIndex;
pub use loader::{flatten_record, load_corpus, PatientRecord};
pub use pipeline::{RagPipeline, RagPipelineBuilder, NO_SOURCE_MATERIAL};
pub use retry::{build_prompt, RetryingGenerator, Sleeper, TokioSleeper};
pub use source::{PassageSource, PubMedSource};

//! RAG pipeline orchestrator.
//!
//! [`RagPipeline`] composes the chunker, the per-run [`VectorIndex`], an
//! [`EmbeddingProvider`], and a [`RetryingGenerator`] into one end-to-end
//! flow: chunk the corpus, embed the chunks, build the index, embed the
//! query, retrieve the nearest passages, and generate a grounded answer.
//!
//! Each run owns its own index and chunk buffers; nothing is shared between
//! runs or persisted afterwards, so concurrent runs need no coordination.
//!
//! # Example
//!
//! ```rust,ignore
//! use medqa_rag::{RagPipeline, RagConfig};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .generation_provider(Arc::new(generator))
//!     .build()?;
//!
//! let answer = pipeline.run(&note_text, "Why was the patient prescribed an antibiotic?").await?;
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::{chunk_text, clean_text};
use crate::config::RagConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::GenerationProvider;
use crate::index::VectorIndex;
use crate::retry::{RetryingGenerator, Sleeper};
use crate::source::PassageSource;

/// Sentinel answer returned when a passage source yields nothing.
pub const NO_SOURCE_MATERIAL: &str = "No relevant source material was found for this question.";

/// The retrieval-augmented generation orchestrator.
///
/// Construct one via [`RagPipeline::builder()`]. The pipeline itself is
/// stateless across runs and safe to share behind an `Arc`.
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    generator: RetryingGenerator,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Answer a question over a flat corpus text.
    ///
    /// Cleans and chunks the corpus, then runs the shared
    /// embed → index → retrieve → generate flow.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyCorpus`] if the text yields zero chunks; no
    ///   embedding call is made in that case.
    /// - [`RagError::DimensionMismatch`] if a provider returns vectors of the
    ///   wrong length.
    /// - Embedding and generation errors as described in the provider traits.
    pub async fn run(&self, corpus_text: &str, query: &str) -> Result<String> {
        let chunks = chunk_text(&clean_text(corpus_text), self.config.max_tokens);
        if chunks.is_empty() {
            error!("corpus produced zero chunks");
            return Err(RagError::EmptyCorpus);
        }
        info!(chunk_count = chunks.len(), "corpus chunked");

        self.answer_over_passages(chunks, query).await
    }

    /// Answer a question over passages that are already retrieval-sized.
    ///
    /// The passages (e.g. literature abstracts) become index entries as-is;
    /// the chunking stage is skipped. Otherwise the flow is identical to
    /// [`run`](RagPipeline::run).
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyCorpus`] if `passages` is empty; no embedding call
    ///   is made in that case.
    /// - Everything else as for [`run`](RagPipeline::run).
    pub async fn run_retrieved(&self, passages: Vec<String>, query: &str) -> Result<String> {
        if passages.is_empty() {
            error!("no passages to answer over");
            return Err(RagError::EmptyCorpus);
        }
        self.answer_over_passages(passages, query).await
    }

    /// Answer a question over passages obtained from an external source.
    ///
    /// Fetches up to `max_results` passages and hands them to
    /// [`run_retrieved`](RagPipeline::run_retrieved). If the source yields
    /// zero passages the pipeline short-circuits with [`NO_SOURCE_MATERIAL`]
    /// before any embedding or generation call.
    pub async fn run_with_source(
        &self,
        source: &dyn PassageSource,
        query: &str,
        max_results: usize,
    ) -> Result<String> {
        let passages = source.fetch(query, max_results).await?;
        if passages.is_empty() {
            info!("passage source yielded nothing; skipping retrieval and generation");
            return Ok(NO_SOURCE_MATERIAL.to_string());
        }
        info!(passage_count = passages.len(), "passages fetched");

        self.run_retrieved(passages, query).await
    }

    /// The shared embed → index → retrieve → generate flow.
    async fn answer_over_passages(&self, passages: Vec<String>, query: &str) -> Result<String> {
        // Embed every passage. Order is preserved by embed_batch, which is
        // what ties search results back to their originating passages.
        let texts: Vec<&str> = passages.iter().map(String::as_str).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await.inspect_err(|e| {
            error!(error = %e, "passage embedding failed");
        })?;

        let mut index = VectorIndex::new(self.config.dimensions);
        index.build(embeddings, passages)?;

        let query_embedding = self.embedding_provider.embed(query).await.inspect_err(|e| {
            error!(error = %e, "query embedding failed");
        })?;

        // An empty retrieval is not an error: a contextless prompt is still
        // valid input to generation.
        let retrieved = index.search(&query_embedding, self.config.top_k)?;
        info!(retrieved = retrieved.len(), top_k = self.config.top_k, "passages retrieved");

        self.generator.generate_with_retry(query, &retrieved).await
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `config`, `embedding_provider`, and `generation_provider` are required;
/// the sleeper defaults to real `tokio` time.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    generation_provider: Option<Arc<dyn GenerationProvider>>,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the generation provider.
    pub fn generation_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.generation_provider = Some(provider);
        self
    }

    /// Inject a [`Sleeper`] for retry backoff. Intended for tests.
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set
    /// and that the configuration is consistent with the embedding provider.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a required field is missing or the
    /// provider's dimensionality disagrees with the configuration.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let generation_provider = self
            .generation_provider
            .ok_or_else(|| RagError::Config("generation_provider is required".to_string()))?;

        if embedding_provider.dimensions() != config.dimensions {
            return Err(RagError::Config(format!(
                "embedding provider produces {}-dimensional vectors but the pipeline is configured for {}",
                embedding_provider.dimensions(),
                config.dimensions
            )));
        }

        let generator = match self.sleeper {
            Some(sleeper) => RetryingGenerator::with_sleeper(generation_provider, sleeper),
            None => RetryingGenerator::new(generation_provider),
        };

        Ok(RagPipeline { config, embedding_provider, generator })
    }
}

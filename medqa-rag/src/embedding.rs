//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that maps text to fixed-dimension embedding vectors.
///
/// Implementations wrap a specific embedding backend behind a unified async
/// interface. Every returned vector must have exactly
/// [`dimensions()`](EmbeddingProvider::dimensions) elements — the pipeline's
/// [`VectorIndex`](crate::index::VectorIndex) rejects anything else.
///
/// Embedding failures are fatal to the current run. Implementations must not
/// retry internally; the retry policy in this system belongs to the
/// generation step only.
///
/// # Example
///
/// ```rust,ignore
/// use medqa_rag::EmbeddingProvider;
///
/// let embedding = provider.embed("Patient has fever.").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    ///
    /// Returns [`RagError::Embedding`](crate::error::RagError::Embedding) if
    /// the backend yields no usable vector, including an explicitly empty one.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially for each input, preserving input order. Override when the
    /// backend supports native batching.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}

//! Configuration for the RAG pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for a [`RagPipeline`](crate::pipeline::RagPipeline).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Embedding dimensionality; every vector entering the index must match.
    pub dimensions: usize,
    /// Number of passages to retrieve per query.
    pub top_k: usize,
    /// Approximate token budget per chunk (converted at 4 characters/token).
    pub max_tokens: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { dimensions: 768, top_k: 3, max_tokens: 300 }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the embedding dimensionality.
    pub fn dimensions(mut self, dimensions: usize) -> Self {
        self.config.dimensions = dimensions;
        self
    }

    /// Set the number of passages to retrieve per query.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    /// Set the approximate token budget per chunk.
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `dimensions`, `top_k`, or `max_tokens`
    /// is zero.
    pub fn build(self) -> Result<RagConfig> {
        if self.config.dimensions == 0 {
            return Err(RagError::Config("dimensions must be greater than zero".to_string()));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.max_tokens == 0 {
            return Err(RagError::Config("max_tokens must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RagConfig::builder().build().unwrap();
        assert_eq!(config, RagConfig::default());
    }

    #[test]
    fn zero_top_k_is_rejected() {
        assert!(matches!(
            RagConfig::builder().top_k(0).build(),
            Err(RagError::Config(_))
        ));
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        assert!(RagConfig::builder().max_tokens(0).build().is_err());
    }
}

//! In-memory brute-force vector index over squared L2 distance.
//!
//! This module provides [`VectorIndex`], an exact nearest-neighbor index for
//! the small corpora this system works with (tens to low thousands of
//! passages). Entries are stored in insertion order and every query is a
//! linear O(n·D) scan — no partitioning or quantization, and none is needed
//! at this scale. The interface is deliberately narrow (`build` then
//! `search`) so an approximate backend could be substituted later without
//! touching callers.

use tracing::debug;

use crate::error::{RagError, Result};

/// An exact, in-memory vector index pairing embeddings with text payloads.
///
/// Built once per pipeline run and read-only afterwards. `build` replaces any
/// prior contents; there is no incremental insertion or deletion.
///
/// # Example
///
/// ```rust,ignore
/// use medqa_rag::VectorIndex;
///
/// let mut index = VectorIndex::new(768);
/// index.build(embeddings, chunks)?;
/// let nearest = index.search(&query_embedding, 3)?;
/// ```
#[derive(Debug)]
pub struct VectorIndex {
    dimensions: usize,
    entries: Vec<(Vec<f32>, String)>,
}

/// Squared Euclidean distance between two equal-length vectors.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl VectorIndex {
    /// Create an empty index accepting vectors of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, entries: Vec::new() }
    }

    /// Return the configured vector dimensionality.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Return the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the index from embeddings and their payloads, replacing any
    /// prior contents.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the embedding and payload
    /// counts differ, or if any embedding's length differs from the
    /// configured dimensionality. On error the index is left empty — it is
    /// never partially populated.
    pub fn build(&mut self, embeddings: Vec<Vec<f32>>, payloads: Vec<String>) -> Result<()> {
        self.entries.clear();

        if embeddings.len() != payloads.len() {
            return Err(RagError::DimensionMismatch {
                what: "entry count",
                expected: payloads.len(),
                actual: embeddings.len(),
            });
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimensions) {
            return Err(RagError::DimensionMismatch {
                what: "vector length",
                expected: self.dimensions,
                actual: bad.len(),
            });
        }

        self.entries = embeddings.into_iter().zip(payloads).collect();
        debug!(entries = self.entries.len(), dimensions = self.dimensions, "index built");
        Ok(())
    }

    /// Return up to `top_k` payloads nearest to `query`, ascending by
    /// squared L2 distance.
    ///
    /// Ties are broken by insertion order (earlier entries first), so results
    /// are deterministic. If `top_k` exceeds the number of stored entries all
    /// entries are returned; an empty index yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the query vector's length
    /// differs from the configured dimensionality.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<String>> {
        if query.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                what: "query vector length",
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(f32, usize)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (embedding, _))| (squared_l2(query, embedding), i))
            .collect();

        // Stable sort preserves insertion order for equal distances.
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored.into_iter().map(|(_, i)| self.entries[i].1.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(v: &[f32]) -> Vec<f32> {
        v.to_vec()
    }

    #[test]
    fn search_returns_nearest_first() {
        let mut index = VectorIndex::new(2);
        index
            .build(
                vec![entry(&[0.0, 0.0]), entry(&[1.0, 1.0]), entry(&[5.0, 5.0])],
                vec!["origin".into(), "near".into(), "far".into()],
            )
            .unwrap();

        let results = index.search(&[0.9, 0.9], 2).unwrap();
        assert_eq!(results, vec!["near".to_string(), "origin".to_string()]);
    }

    #[test]
    fn top_k_larger_than_index_returns_all() {
        let mut index = VectorIndex::new(1);
        index
            .build(vec![entry(&[1.0]), entry(&[2.0])], vec!["a".into(), "b".into()])
            .unwrap();

        let results = index.search(&[0.0], 10).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn empty_index_returns_empty_result() {
        let index = VectorIndex::new(3);
        assert!(index.search(&[0.0, 0.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn identical_vectors_keep_insertion_order() {
        let mut index = VectorIndex::new(2);
        index
            .build(
                vec![entry(&[1.0, 1.0]), entry(&[1.0, 1.0]), entry(&[1.0, 1.0])],
                vec!["first".into(), "second".into(), "third".into()],
            )
            .unwrap();

        let results = index.search(&[1.0, 1.0], 3).unwrap();
        assert_eq!(
            results,
            vec!["first".to_string(), "second".to_string(), "third".to_string()]
        );
    }

    #[test]
    fn count_mismatch_fails_and_leaves_index_empty() {
        let mut index = VectorIndex::new(1);
        let err = index
            .build(vec![entry(&[1.0])], vec!["a".into(), "b".into()])
            .unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { what: "entry count", .. }));
        assert!(index.is_empty());
    }

    #[test]
    fn wrong_vector_length_fails_build() {
        let mut index = VectorIndex::new(2);
        let err = index
            .build(vec![entry(&[1.0, 2.0]), entry(&[1.0])], vec!["a".into(), "b".into()])
            .unwrap_err();
        assert!(matches!(
            err,
            RagError::DimensionMismatch { what: "vector length", expected: 2, actual: 1 }
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn wrong_query_length_fails_search() {
        let mut index = VectorIndex::new(2);
        index.build(vec![entry(&[1.0, 2.0])], vec!["a".into()]).unwrap();
        let err = index.search(&[1.0], 1).unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { .. }));
    }

    #[test]
    fn build_replaces_prior_contents() {
        let mut index = VectorIndex::new(1);
        index.build(vec![entry(&[1.0])], vec!["old".into()]).unwrap();
        index.build(vec![entry(&[2.0])], vec!["new".into()]).unwrap();
        assert_eq!(index.search(&[2.0], 5).unwrap(), vec!["new".to_string()]);
    }
}

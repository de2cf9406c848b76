//! Immutable in-memory vector index with exact cosine-similarity search.
//!
//! The index is built exactly once at startup from chunk/vector pairs and is
//! read-only thereafter, so it can be shared behind an `Arc` by any number of
//! concurrent request handlers without locking. Search is an exact linear
//! scan; that is the reference ranking any approximate substitute would have
//! to reproduce.

use thiserror::Error;
use tracing::debug;

use crate::types::{Chunk, ScoredChunk};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    /// Two stored vectors (or the query) disagree on dimension.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// `build` was called with no entries; serving an empty index is refused.
    #[error("cannot build an index with no entries")]
    EmptyIndex,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// A chunk paired with its embedding, ready for indexing.
#[derive(Clone, Debug)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

impl IndexEntry {
    pub fn new(chunk: Chunk, vector: Vec<f32>) -> Self {
        Self { chunk, vector }
    }
}

struct StoredEntry {
    chunk: Chunk,
    vector: Vec<f32>,
    magnitude: f32,
}

/// The one-shot, immutable k-nearest-neighbor index over chunk embeddings.
pub struct VectorIndex {
    entries: Vec<StoredEntry>,
    dimension: usize,
}

impl VectorIndex {
    /// Build the index from chunk/vector pairs.
    ///
    /// Fails with [`IndexError::EmptyIndex`] when `entries` is empty and
    /// [`IndexError::DimensionMismatch`] when any two vectors differ in
    /// length. Entry magnitudes are precomputed here so each query costs one
    /// dot product per entry.
    pub fn build(entries: Vec<IndexEntry>) -> Result<Self, IndexError> {
        let Some(first) = entries.first() else {
            return Err(IndexError::EmptyIndex);
        };
        let dimension = first.vector.len();

        let mut stored = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    actual: entry.vector.len(),
                });
            }
            let magnitude = magnitude(&entry.vector);
            stored.push(StoredEntry {
                chunk: entry.chunk,
                vector: entry.vector,
                magnitude,
            });
        }

        debug!(
            entries = stored.len(),
            dimension, "vector index built"
        );
        Ok(Self {
            entries: stored,
            dimension,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension every stored (and query) vector must have.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Return the `k` entries most similar to `query` by cosine similarity,
    /// highest score first.
    ///
    /// Ties in score break by ascending chunk id, so output is deterministic
    /// for deterministic input. Stored zero-magnitude vectors never match and
    /// are skipped rather than dividing by zero; a zero-magnitude query
    /// therefore matches nothing. `k` larger than the entry count returns all
    /// (matchable) entries ranked.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, IndexError> {
        if k == 0 {
            return Err(IndexError::InvalidArgument(
                "k must be at least 1".to_string(),
            ));
        }
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let query_magnitude = magnitude(query);
        if query_magnitude == 0.0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .filter(|entry| entry.magnitude > 0.0)
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: dot(query, &entry.vector) / (query_magnitude * entry.magnitude),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        scored.truncate(k);
        Ok(scored)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

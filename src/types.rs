//! Core data model shared across the retrieval pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::{EmbeddingError, GenerationError};
use crate::index::IndexError;

/// One page of extracted document text, as produced by a [`DocumentLoader`].
///
/// Pages are consumed exactly once by the chunker at startup; only chunks
/// survive into the serving phase.
///
/// [`DocumentLoader`]: crate::loader::DocumentLoader
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based page position within the document.
    pub index: usize,
    pub text: String,
}

impl Page {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// A bounded contiguous slice of document text, the unit of retrieval.
///
/// Ids are dense, assigned in chunking order, and never reused; they are the
/// join key into the vector index and the tie-breaker during ranking.
/// `offset` is the character offset of the start of `text` within its source
/// page, including any overlap prefix shared with the preceding chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: usize,
    pub text: String,
    pub source_page: usize,
    pub offset: usize,
}

/// A retrieved chunk paired with its cosine similarity to the query.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Per-request failures surfaced by [`QaService::answer_question`].
///
/// Any variant here degrades a single request only; startup failures use
/// [`StartupError`] instead and refuse the whole process.
///
/// [`QaService::answer_question`]: crate::service::QaService::answer_question
/// [`StartupError`]: crate::service::StartupError
#[derive(Debug, Error)]
pub enum QaError {
    /// The request itself is malformed (empty question, non-positive k).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The embedding capability failed; retrieval could not run.
    #[error("retrieval unavailable: {0}")]
    RetrievalUnavailable(#[source] EmbeddingError),

    /// The generation capability failed; an answer could not be composed.
    #[error("generation unavailable: {0}")]
    GenerationUnavailable(#[source] GenerationError),

    /// Internal index failure (should not occur for a well-built index).
    #[error("index error: {0}")]
    Index(#[from] IndexError),
}

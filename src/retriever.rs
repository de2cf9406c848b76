//! Query-time retrieval: embed the question, search the index.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::capabilities::{EmbeddingCapability, EmbeddingError};
use crate::index::{IndexError, VectorIndex};
use crate::types::ScoredChunk;

#[derive(Debug, Error)]
pub enum RetrieveError {
    /// The embedding capability failed; no retry is attempted here.
    #[error("embedding capability unavailable: {0}")]
    Unavailable(#[source] EmbeddingError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Embeds an incoming question and delegates to the shared [`VectorIndex`].
///
/// Performs no filtering or re-ranking beyond what the index provides.
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingCapability>,
}

impl Retriever {
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn EmbeddingCapability>) -> Self {
        Self { index, embedder }
    }

    pub async fn retrieve(
        &self,
        question: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, RetrieveError> {
        let query = self
            .embedder
            .embed(question)
            .await
            .map_err(RetrieveError::Unavailable)?;

        let results = self.index.search(&query, k)?;
        debug!(
            k,
            returned = results.len(),
            top_score = results.first().map(|r| r.score),
            "retrieval complete"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::MockEmbedder;
    use crate::index::IndexEntry;
    use crate::types::Chunk;

    fn index_over(texts: &[&str], embedder: &MockEmbedder) -> Arc<VectorIndex> {
        let entries = texts
            .iter()
            .enumerate()
            .map(|(id, text)| {
                IndexEntry::new(
                    Chunk {
                        id,
                        text: text.to_string(),
                        source_page: 0,
                        offset: 0,
                    },
                    embedder.vector_for(text),
                )
            })
            .collect();
        Arc::new(VectorIndex::build(entries).unwrap())
    }

    #[tokio::test]
    async fn retrieves_the_identically_embedded_chunk_first() {
        let embedder = MockEmbedder::new();
        let index = index_over(&["alpha text", "beta text", "gamma text"], &embedder);
        let retriever = Retriever::new(index, Arc::new(MockEmbedder::new()));

        let results = retriever.retrieve("beta text", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "beta text");
        assert!((results[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn embedding_failure_is_unavailable() {
        let embedder = MockEmbedder::new();
        let index = index_over(&["only chunk"], &embedder);
        let retriever = Retriever::new(index, Arc::new(MockEmbedder::failing()));

        let result = retriever.retrieve("question", 1).await;
        assert!(matches!(result, Err(RetrieveError::Unavailable(_))));
    }
}

//! The explicitly constructed question-answering pipeline.
//!
//! `QaService::init` runs the one-shot build: load pages, chunk, embed every
//! chunk, build the vector index. Any failure there is fatal and the process
//! must refuse to serve. Afterwards the service is immutable and shared
//! read-only by all requests; `answer_question` is the single operation the
//! transport layer calls.

use std::sync::Arc;

use futures_util::{StreamExt, TryStreamExt, stream};
use thiserror::Error;
use tracing::info;

use crate::capabilities::{EmbeddingCapability, EmbeddingError, GenerationCapability};
use crate::chunker::{Chunker, ChunkerError};
use crate::composer::{AnswerComposer, ComposeError};
use crate::config::{ConfigError, QaConfig};
use crate::index::{IndexEntry, IndexError, VectorIndex};
use crate::loader::{DocumentLoader, DocumentLoadError};
use crate::retriever::{RetrieveError, Retriever};
use crate::types::QaError;

/// Fatal build-time failures. The server logs these and exits without ever
/// binding a listener.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    DocumentLoad(#[from] DocumentLoadError),

    #[error(transparent)]
    Chunking(#[from] ChunkerError),

    #[error("failed to embed document chunks: {0}")]
    Embedding(#[source] EmbeddingError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

pub struct QaService {
    index: Arc<VectorIndex>,
    retriever: Retriever,
    composer: AnswerComposer,
    top_k: usize,
}

impl QaService {
    /// Build the pipeline: load → chunk → embed → index. Runs exactly once,
    /// to completion, before any query is served.
    ///
    /// Chunk embeddings are fetched through an ordered stream with at most
    /// `config.embed_concurrency` outbound calls in flight, protecting
    /// downstream rate limits while keeping chunk/vector pairing positional.
    pub async fn init(
        config: &QaConfig,
        loader: &dyn DocumentLoader,
        embedder: Arc<dyn EmbeddingCapability>,
        generator: Arc<dyn GenerationCapability>,
    ) -> Result<Self, StartupError> {
        config.validate()?;
        let chunker = Chunker::new(config.max_chunk_size, config.overlap)?;

        let pages = loader.load(&config.document_path).await?;
        let chunks = chunker.split(&pages);
        info!(
            document = %config.document_path.display(),
            pages = pages.len(),
            chunks = chunks.len(),
            "document chunked"
        );

        let vectors: Vec<Vec<f32>> = stream::iter(chunks.iter().map(|chunk| {
            let embedder = Arc::clone(&embedder);
            let text = chunk.text.clone();
            async move { embedder.embed(&text).await }
        }))
        .buffered(config.embed_concurrency)
        .try_collect()
        .await
        .map_err(StartupError::Embedding)?;

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry::new(chunk, vector))
            .collect();
        let index = Arc::new(VectorIndex::build(entries)?);
        info!(
            entries = index.len(),
            dimension = index.dimension(),
            "vector index ready"
        );

        Ok(Self {
            retriever: Retriever::new(Arc::clone(&index), embedder),
            composer: AnswerComposer::new(generator, config.max_context_chars),
            top_k: config.top_k,
            index,
        })
    }

    /// The built, immutable index (for startup logging and introspection).
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Answer one question: validate, retrieve, compose.
    ///
    /// An empty or whitespace-only question is rejected before any
    /// capability call. Capability failures degrade this request only.
    pub async fn answer_question(&self, question: &str) -> Result<String, QaError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QaError::InvalidArgument(
                "question must not be empty".to_string(),
            ));
        }

        let retrieved = self
            .retriever
            .retrieve(question, self.top_k)
            .await
            .map_err(|err| match err {
                RetrieveError::Unavailable(source) => QaError::RetrievalUnavailable(source),
                RetrieveError::Index(source) => QaError::Index(source),
            })?;

        let answer = self
            .composer
            .compose(question, &retrieved)
            .await
            .map_err(|ComposeError::Unavailable(source)| {
                QaError::GenerationUnavailable(source)
            })?;

        info!(
            question_chars = question.chars().count(),
            retrieved = retrieved.len(),
            "question answered"
        );
        Ok(answer)
    }
}

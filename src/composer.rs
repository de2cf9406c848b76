//! Answer composition: context assembly, prompt building, generation.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::capabilities::{GenerationCapability, GenerationError, GenerationRequest};
use crate::types::ScoredChunk;

/// Fixed system instruction carried by every generation request.
pub const SYSTEM_INSTRUCTION: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, just say that you don't know. \
Use three sentences maximum and keep the answer concise.";

/// Returned instead of an error when the generation capability replies
/// without an answer field.
pub const NO_ANSWER_FALLBACK: &str = "No answer found.";

/// Blank-line delimiter between chunks in the context block. The block is
/// consumed by a language model, not parsed back, so chunk-internal blank
/// lines are harmless.
const CONTEXT_DELIMITER: &str = "\n\n";

#[derive(Debug, Error)]
pub enum ComposeError {
    /// The generation capability failed; the caller maps this to a
    /// transport-level error response.
    #[error("generation capability unavailable: {0}")]
    Unavailable(#[source] GenerationError),
}

/// Assembles a bounded prompt from ranked chunks and invokes the generation
/// capability.
pub struct AnswerComposer {
    generator: Arc<dyn GenerationCapability>,
    max_context_chars: usize,
}

impl AnswerComposer {
    pub fn new(generator: Arc<dyn GenerationCapability>, max_context_chars: usize) -> Self {
        Self {
            generator,
            max_context_chars,
        }
    }

    pub async fn compose(
        &self,
        question: &str,
        retrieved: &[ScoredChunk],
    ) -> Result<String, ComposeError> {
        let context = self.build_context(retrieved);
        let request = GenerationRequest {
            system: format!("{SYSTEM_INSTRUCTION}{CONTEXT_DELIMITER}{context}"),
            user: question.to_string(),
        };

        let response = self
            .generator
            .generate(&request)
            .await
            .map_err(ComposeError::Unavailable)?;

        debug!(
            chunks = retrieved.len(),
            context_chars = context.chars().count(),
            answered = response.answer.is_some(),
            "composition complete"
        );
        Ok(response
            .answer
            .unwrap_or_else(|| NO_ANSWER_FALLBACK.to_string()))
    }

    /// Join chunk texts in rank order, dropping lowest-ranked chunks once the
    /// configured character budget is exceeded. The top-ranked chunk is
    /// always included.
    fn build_context(&self, retrieved: &[ScoredChunk]) -> String {
        let mut context = String::new();
        let mut used = 0usize;
        for (rank, scored) in retrieved.iter().enumerate() {
            let len = scored.chunk.text.chars().count();
            if rank > 0 && used + len > self.max_context_chars {
                debug!(
                    dropped = retrieved.len() - rank,
                    "context budget exceeded, dropping lowest-ranked chunks"
                );
                break;
            }
            if rank > 0 {
                context.push_str(CONTEXT_DELIMITER);
            }
            context.push_str(&scored.chunk.text);
            used += len;
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::MockGenerator;
    use crate::types::Chunk;

    fn scored(id: usize, text: &str, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                id,
                text: text.to_string(),
                source_page: 0,
                offset: 0,
            },
            score,
        }
    }

    #[tokio::test]
    async fn prompt_carries_instruction_context_and_question() {
        let generator = Arc::new(MockGenerator::answering("the answer"));
        let composer = AnswerComposer::new(generator.clone(), 1000);

        let retrieved = vec![scored(0, "first chunk", 0.9), scored(1, "second chunk", 0.5)];
        let answer = composer.compose("what is it?", &retrieved).await.unwrap();
        assert_eq!(answer, "the answer");

        let request = generator.last_request().unwrap();
        assert!(request.system.starts_with(SYSTEM_INSTRUCTION));
        assert!(request.system.contains("first chunk\n\nsecond chunk"));
        assert_eq!(request.user, "what is it?");
    }

    #[tokio::test]
    async fn missing_answer_yields_sentinel() {
        let composer = AnswerComposer::new(Arc::new(MockGenerator::without_answer()), 1000);
        let answer = composer
            .compose("question", &[scored(0, "context", 1.0)])
            .await
            .unwrap();
        assert_eq!(answer, NO_ANSWER_FALLBACK);
    }

    #[tokio::test]
    async fn generation_failure_is_unavailable() {
        let composer = AnswerComposer::new(Arc::new(MockGenerator::failing()), 1000);
        let result = composer.compose("question", &[scored(0, "context", 1.0)]).await;
        assert!(matches!(result, Err(ComposeError::Unavailable(_))));
    }

    #[tokio::test]
    async fn context_budget_drops_lowest_ranked_first() {
        let generator = Arc::new(MockGenerator::answering("ok"));
        let composer = AnswerComposer::new(generator.clone(), 12);

        let retrieved = vec![
            scored(0, "0123456789", 0.9), // 10 chars, always included
            scored(1, "abcdefgh", 0.5),   // would exceed the budget
        ];
        composer.compose("q", &retrieved).await.unwrap();

        let request = generator.last_request().unwrap();
        assert!(request.system.contains("0123456789"));
        assert!(!request.system.contains("abcdefgh"));
    }

    #[tokio::test]
    async fn oversized_top_chunk_is_still_included() {
        let generator = Arc::new(MockGenerator::answering("ok"));
        let composer = AnswerComposer::new(generator.clone(), 4);

        composer
            .compose("q", &[scored(0, "longer than budget", 1.0)])
            .await
            .unwrap();
        assert!(
            generator
                .last_request()
                .unwrap()
                .system
                .contains("longer than budget")
        );
    }
}

//! Deterministic in-process capabilities for tests and offline runs.
//!
//! The mock embedder derives a stable pseudo-embedding from a hash of the
//! input text, so identical texts always embed identically and the full
//! pipeline can be exercised without network access. Both mocks count their
//! invocations so tests can assert a capability was never called.

use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{
    EmbeddingCapability, EmbeddingError, GenerationCapability, GenerationError,
    GenerationRequest, GenerationResponse,
};

const DEFAULT_DIMENSION: usize = 8;

/// Deterministic [`EmbeddingCapability`] for tests.
pub struct MockEmbedder {
    dimension: usize,
    fail: bool,
    calls: AtomicUsize,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::with_dimension(DEFAULT_DIMENSION)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// An embedder whose every call fails, for outage scenarios.
    pub fn failing() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `embed` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The vector this mock produces for `text`, without counting a call.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        (0..self.dimension)
            .map(|component| {
                let mut hasher = std::collections::hash_map::DefaultHasher::new();
                text.hash(&mut hasher);
                component.hash(&mut hasher);
                let raw = hasher.finish();
                // Map the hash into [-1, 1].
                (raw as f64 / u64::MAX as f64 * 2.0 - 1.0) as f32
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingCapability for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmbeddingError::Status {
                status: 503,
                body: "mock embedder unavailable".to_string(),
            });
        }
        Ok(self.vector_for(text))
    }
}

enum MockGeneratorBehavior {
    Answer(String),
    NoAnswer,
    Fail,
}

/// Scripted [`GenerationCapability`] for tests. Records the last request it
/// saw so prompt assembly can be asserted.
pub struct MockGenerator {
    behavior: MockGeneratorBehavior,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockGenerator {
    /// Always replies with `answer`.
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            behavior: MockGeneratorBehavior::Answer(answer.into()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Replies successfully but with no answer field.
    pub fn without_answer() -> Self {
        Self {
            behavior: MockGeneratorBehavior::NoAnswer,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Every call fails, for outage scenarios.
    pub fn failing() -> Self {
        Self {
            behavior: MockGeneratorBehavior::Fail,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of `generate` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any call was made.
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request
            .lock()
            .expect("mock generator mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl GenerationCapability for MockGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_request
            .lock()
            .expect("mock generator mutex poisoned") = Some(request.clone());

        match &self.behavior {
            MockGeneratorBehavior::Answer(answer) => Ok(GenerationResponse {
                answer: Some(answer.clone()),
            }),
            MockGeneratorBehavior::NoAnswer => Ok(GenerationResponse { answer: None }),
            MockGeneratorBehavior::Fail => Err(GenerationError::Status {
                status: 503,
                body: "mock generator unavailable".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_embeddings_are_deterministic() {
        let embedder = MockEmbedder::new();
        let a = embedder.embed("hello world").await.unwrap();
        let b = embedder.embed("hello world").await.unwrap();
        let c = embedder.embed("goodbye world").await.unwrap();

        assert_eq!(a, b, "identical text should embed identically");
        assert_ne!(a, c, "different text should embed differently");
        assert_eq!(a.len(), DEFAULT_DIMENSION);
        assert_eq!(embedder.calls(), 3);
    }

    #[tokio::test]
    async fn failing_mocks_fail_and_count() {
        let embedder = MockEmbedder::failing();
        assert!(embedder.embed("x").await.is_err());
        assert_eq!(embedder.calls(), 1);

        let generator = MockGenerator::failing();
        let request = GenerationRequest {
            system: "s".to_string(),
            user: "u".to_string(),
        };
        assert!(generator.generate(&request).await.is_err());
        assert_eq!(generator.calls(), 1);
        assert_eq!(generator.last_request(), Some(request));
    }
}

//! External model capabilities consumed by the pipeline.
//!
//! The core treats the embedding and generation models as narrow capability
//! interfaces: [`EmbeddingCapability`] maps text to a fixed-dimension vector,
//! [`GenerationCapability`] turns a composed prompt into an answer. Neither
//! trait retries on failure; retry policy (and per-call timeouts) belongs to
//! a wrapper around the capability, not to the core, since blanket retries
//! risk duplicate billed calls.
//!
//! Production implementations live in [`http`]; deterministic in-process
//! implementations for tests live in [`mock`].

pub mod http;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

pub use http::{HttpEmbedder, HttpGenerator};
pub use mock::{MockEmbedder, MockGenerator};

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("embedding endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

/// A composed prompt: fixed system instruction plus the user turn carrying
/// the context block and the question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
}

/// The generation capability's reply. `answer` is optional on the wire; the
/// composer substitutes a sentinel when it is absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    pub answer: Option<String>,
}

/// Maps a text to a fixed-dimension embedding vector.
///
/// The dimension is fixed by the capability for the lifetime of the process;
/// the index build fails fast if implementations violate this.
#[async_trait]
pub trait EmbeddingCapability: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Produces an answer for a composed prompt.
#[async_trait]
pub trait GenerationCapability: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError>;
}

//! Question answering over a single document.
//!
//! ```text
//! Startup:
//!   loader::DocumentLoader ──► pages ──► chunker::Chunker ──► chunks
//!                                                              │
//!                        capabilities::EmbeddingCapability ◄───┤
//!                                                              ▼
//!                                             index::VectorIndex::build
//!
//! Per request:
//!   question ──► retriever::Retriever ──► ranked chunks
//!                                              │
//!   composer::AnswerComposer ◄─────────────────┘
//!        │
//!        └─► capabilities::GenerationCapability ──► answer
//! ```
//!
//! The index is built exactly once, before serving begins, and is immutable
//! afterwards; [`service::QaService`] wires the stages together and exposes
//! the one operation the HTTP boundary calls.

pub mod capabilities;
pub mod chunker;
pub mod composer;
pub mod config;
pub mod index;
pub mod loader;
pub mod retriever;
pub mod server;
pub mod service;
pub mod types;

pub use chunker::Chunker;
pub use composer::{AnswerComposer, NO_ANSWER_FALLBACK};
pub use config::QaConfig;
pub use index::{IndexEntry, VectorIndex};
pub use retriever::Retriever;
pub use service::QaService;
pub use types::{Chunk, Page, QaError, ScoredChunk};

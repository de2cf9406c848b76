//! Environment-driven configuration, validated once at startup.
//!
//! Values come from the process environment (a `.env` file is honored via
//! `dotenvy`). Every knob has a documented default except the document path
//! and the API key; validation failures are fatal before any chunking or
//! serving begins.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DOCQA_DOCUMENT` | required |
//! | `DOCQA_API_KEY` | required |
//! | `DOCQA_API_BASE_URL` | `https://dashscope.aliyuncs.com/compatible-mode/v1` |
//! | `DOCQA_EMBEDDING_MODEL` | `text-embedding-v2` |
//! | `DOCQA_CHAT_MODEL` | `qwen-plus` |
//! | `DOCQA_MAX_CHUNK_SIZE` | `1000` |
//! | `DOCQA_CHUNK_OVERLAP` | `200` |
//! | `DOCQA_TOP_K` | `4` |
//! | `DOCQA_MAX_CONTEXT_CHARS` | `12000` |
//! | `DOCQA_EMBED_CONCURRENCY` | `8` |
//! | `DOCQA_BIND_ADDR` | `127.0.0.1:5000` |
//!
//! None of the size defaults is load-bearing for correctness; they follow
//! the common retrieval presets (about a thousand characters per chunk, a
//! fifth of that as overlap, four chunks per answer).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

use crate::chunker::{Chunker, ChunkerError};

pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_TOP_K: usize = 4;
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 12_000;
pub const DEFAULT_EMBED_CONCURRENCY: usize = 8;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_API_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-v2";
pub const DEFAULT_CHAT_MODEL: &str = "qwen-plus";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {name} is invalid: {reason}")]
    InvalidVar { name: &'static str, reason: String },

    #[error(transparent)]
    Chunking(#[from] ChunkerError),

    #[error("top_k must be at least 1")]
    ZeroTopK,

    #[error("embed concurrency must be at least 1")]
    ZeroConcurrency,
}

/// Where and how to reach the OpenAI-compatible model endpoints.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: Url,
    pub api_key: String,
    pub embedding_model: String,
    pub chat_model: String,
}

/// Validated startup configuration for the whole pipeline.
#[derive(Clone, Debug)]
pub struct QaConfig {
    pub document_path: PathBuf,
    pub max_chunk_size: usize,
    pub overlap: usize,
    pub top_k: usize,
    pub max_context_chars: usize,
    pub embed_concurrency: usize,
    pub bind_addr: SocketAddr,
    pub api: ApiConfig,
}

impl QaConfig {
    /// A config with every tunable at its default.
    pub fn new(document_path: impl Into<PathBuf>, api: ApiConfig) -> Self {
        Self {
            document_path: document_path.into(),
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
            embed_concurrency: DEFAULT_EMBED_CONCURRENCY,
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .expect("default bind address parses"),
            api,
        }
    }

    /// Read configuration from the environment, honoring a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api = ApiConfig {
            base_url: parse_var("DOCQA_API_BASE_URL", DEFAULT_API_BASE_URL)?,
            api_key: required("DOCQA_API_KEY")?,
            embedding_model: var_or("DOCQA_EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            chat_model: var_or("DOCQA_CHAT_MODEL", DEFAULT_CHAT_MODEL),
        };

        let config = Self {
            document_path: PathBuf::from(required("DOCQA_DOCUMENT")?),
            max_chunk_size: parse_var("DOCQA_MAX_CHUNK_SIZE", DEFAULT_MAX_CHUNK_SIZE)?,
            overlap: parse_var("DOCQA_CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?,
            top_k: parse_var("DOCQA_TOP_K", DEFAULT_TOP_K)?,
            max_context_chars: parse_var("DOCQA_MAX_CONTEXT_CHARS", DEFAULT_MAX_CONTEXT_CHARS)?,
            embed_concurrency: parse_var("DOCQA_EMBED_CONCURRENCY", DEFAULT_EMBED_CONCURRENCY)?,
            bind_addr: parse_var("DOCQA_BIND_ADDR", DEFAULT_BIND_ADDR)?,
            api,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject size configurations the pipeline cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Exercises the same check the chunker applies at construction.
        Chunker::new(self.max_chunk_size, self.overlap)?;
        if self.top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        if self.embed_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &'static str, default: impl ToString) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var_or(name, &default.to_string())
        .parse()
        .map_err(|err: T::Err| ConfigError::InvalidVar {
            name,
            reason: err.to_string(),
        })
}

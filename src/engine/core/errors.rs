//! Error types for the coaching engine.

use thiserror::Error;

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Knowledge entry rejected by validation.
    #[error("invalid knowledge entry: {0}")]
    InvalidKnowledgeEntry(String),
    /// Unknown knowledge entry identifier.
    #[error("knowledge entry not found: {0}")]
    KnowledgeEntryNotFound(String),
    /// A shared lock was poisoned by a panicking holder.
    #[error("lock poisoned: {0}")]
    LockPoisoned(&'static str),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// HTTP client construction failed.
    #[error("http client error: {0}")]
    HttpClient(String),
}

/// Convenience result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

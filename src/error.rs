//! Error types for the esrun host.

use es_retrieve::RetrieveError;

/// Top-level error type for running topics against an index.
#[derive(Debug, thiserror::Error)]
pub enum EsrunError {
    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Topics file is malformed.
    #[error("topics error: {0}")]
    Topics(String),

    /// Retrieval failed.
    #[error(transparent)]
    Retrieve(#[from] RetrieveError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, EsrunError>;

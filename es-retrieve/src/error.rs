//! Error types for the es-retrieve crate.
//!
//! Every failure aborts the batch it occurred in. Messages name the
//! offending qid, extraction path or backend response so callers can
//! report them without further context. Credentials never appear here.

/// Errors that can occur while retrieving a batch of queries.
#[derive(Debug, thiserror::Error)]
pub enum RetrieveError {
    /// The input is not a table, or lacks the `qid`/`query` columns.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A query identifier appears on more than one row.
    #[error("malformed batch: can only process one query per identifier (qid {0})")]
    MalformedBatch(String),

    /// A configured extraction path is absent from a hit's source.
    #[error("field extraction failed: path '{path}' not found in hit '{docno}'")]
    FieldExtraction {
        /// The dotted extraction path that did not resolve.
        path: String,
        /// Identifier of the hit whose source lacked the path.
        docno: String,
    },

    /// The search backend failed (network, authentication, bad request).
    #[error("backend error: {0}")]
    Backend(String),

    /// Invalid retrieval configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for es-retrieve results.
pub type Result<T> = std::result::Result<T, RetrieveError>;

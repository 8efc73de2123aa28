//! Core types shared by the retrieval pipeline.

use serde::{Deserialize, Serialize};

/// Input column holding the query identifier.
pub const QID: &str = "qid";
/// Input column holding the query text.
pub const QUERY: &str = "query";
/// Output column holding the hit's document identifier.
pub const DOCNO: &str = "docno";
/// Output column holding the hit's relevance score.
pub const SCORE: &str = "score";
/// Output column holding the dense per-query rank.
pub const RANK: &str = "rank";

/// Columns the retriever reads or writes itself; extraction destinations may not reuse them.
pub const RESERVED_COLUMNS: &[&str] = &[QID, QUERY, DOCNO, SCORE, RANK];

/// A single search hit returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Document identifier.
    pub id: String,
    /// Relevance score on the backend's scale (higher is more relevant).
    pub score: f64,
    /// The matched document, nested to arbitrary depth.
    pub source: serde_json::Value,
}

impl Hit {
    /// Build a hit from its parts.
    pub fn new(id: impl Into<String>, score: f64, source: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            score,
            source,
        }
    }
}

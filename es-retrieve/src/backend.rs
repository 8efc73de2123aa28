//! Trait definition for the full-text search backend.
//!
//! The retriever only needs two things from a backend: run one multi-field
//! match and describe itself. [`crate::elastic::ElasticClient`] implements
//! this over HTTP; tests substitute in-memory backends.

use serde::{Deserialize, Serialize};

use crate::error::RetrieveError;
use crate::types::Hit;

/// One multi-field match request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Index to search.
    pub index: String,
    /// Query text matched across `fields`.
    pub query: String,
    /// Fields to match against.
    pub fields: Vec<String>,
    /// Upper bound on returned hits; omitted from the request when `None`.
    pub size: Option<usize>,
}

impl SearchRequest {
    /// Render the request body.
    ///
    /// Total-hit counting is always disabled: only the returned hits are used.
    pub fn to_body(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "track_total_hits": false,
            "query": {
                "multi_match": {
                    "query": self.query,
                    "fields": self.fields,
                }
            },
        });
        if let (Some(size), Some(obj)) = (self.size, body.as_object_mut()) {
            obj.insert("size".into(), serde_json::json!(size));
        }
        body
    }
}

/// A stable description of the backend a retriever talks to.
///
/// Captured once when a retriever is built and never refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendIdentity {
    /// Where the backend lives (for HTTP backends, the base URL).
    pub endpoint: String,
    /// The backend's self-description at capture time.
    pub info: serde_json::Value,
}

/// A full-text search backend.
///
/// Implementations are shared across every query group of every batch a
/// retriever processes, so they must be `Send + Sync`.
pub trait SearchBackend: Send + Sync {
    /// Run a single search and return hits in backend order.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError::Backend`] for any transport, authentication
    /// or request failure. Implementations do not retry.
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl std::future::Future<Output = Result<Vec<Hit>, RetrieveError>> + Send;

    /// Describe the backend for configuration fingerprinting.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError::Backend`] if the backend cannot be reached.
    fn identity(
        &self,
    ) -> impl std::future::Future<Output = Result<BackendIdentity, RetrieveError>> + Send;
}

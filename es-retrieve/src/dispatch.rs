//! Issue the backend search for one query.

use crate::backend::{SearchBackend, SearchRequest};
use crate::config::RetrieveConfig;
use crate::error::Result;
use crate::grouping::QueryRow;
use crate::types::Hit;

/// Build the multi-field match request for `query` under `config`.
pub fn build_request(config: &RetrieveConfig, query: &QueryRow) -> SearchRequest {
    SearchRequest {
        index: config.index.clone(),
        query: query.query.clone(),
        fields: config.fields.clone(),
        size: config.num_results,
    }
}

/// Search the backend once for `query` and return its hits in backend order.
///
/// The result cap bounds both the request size and, in case the backend
/// returns more than asked for, the hits handed back.
///
/// # Errors
///
/// Backend failures are returned unchanged. There are no retries.
pub async fn dispatch<B: SearchBackend>(
    backend: &B,
    config: &RetrieveConfig,
    query: &QueryRow,
) -> Result<Vec<Hit>> {
    let request = build_request(config, query);
    let mut hits = backend.search(&request).await?;

    if let Some(cap) = config.num_results {
        if hits.len() > cap {
            tracing::debug!(
                qid = %query.qid_label(),
                returned = hits.len(),
                cap,
                "backend returned more hits than requested, truncating"
            );
            hits.truncate(cap);
        }
    }
    Ok(hits)
}

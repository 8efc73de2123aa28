//! # es-retrieve
//!
//! Batch retrieval against an Elasticsearch index.
//!
//! A batch of queries (a [`Frame`] with `qid` and `query` columns) is split
//! into one query per identifier, each query is sent to the backend as a
//! multi-field match, every hit is merged with its query row, and the rows
//! are ranked densely per query by descending score.
//!
//! ## Design
//!
//! - One backend round-trip per query, processed sequentially in the order
//!   queries first appear
//! - Nested source values copied into output columns via dotted paths
//! - Any failure aborts the batch; [`ElasticRetriever::transform_isolated`]
//!   is available when per-query isolation is preferred
//! - A deterministic [`Fingerprint`] of configuration and backend identity
//!   lets hosts memoize results
//!
//! ## Security
//!
//! - Credentials are redacted from `Debug` output and never logged
//! - Query text is logged only at trace level

pub mod backend;
pub mod config;
pub mod dispatch;
pub mod elastic;
pub mod error;
pub mod fingerprint;
pub mod frame;
pub mod grouping;
pub mod merge;
pub mod progress;
pub mod rank;
pub mod retriever;
pub mod types;

pub use backend::{BackendIdentity, SearchBackend, SearchRequest};
pub use config::{ExtractionMap, RetrieveConfig};
pub use elastic::{ConnectionParams, ElasticClient};
pub use error::{Result, RetrieveError};
pub use fingerprint::Fingerprint;
pub use frame::{Frame, Row};
pub use progress::{ProgressCallback, ProgressEvent};
pub use retriever::{ElasticRetriever, PartialRun, QueryFailure};
pub use types::Hit;

/// Connect to an Elasticsearch cluster and build a retriever for `config`.
///
/// The cluster's identity is fetched once here and fixed for the
/// retriever's lifetime.
///
/// # Errors
///
/// Returns [`RetrieveError::Config`] if `config` or `params` is invalid, and
/// [`RetrieveError::Backend`] if the cluster cannot be reached.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> es_retrieve::Result<()> {
/// use es_retrieve::{ConnectionParams, Frame, RetrieveConfig};
///
/// let config = RetrieveConfig::new("msmarco", ["title", "body"]);
/// let retriever = es_retrieve::connect(config, ConnectionParams::default()).await?;
///
/// let topics = Frame::from_json(serde_json::json!([
///     {"qid": "1", "query": "how do lobsters breathe"},
/// ]))?;
/// let ranked = retriever.transform(&topics).await?;
/// for row in ranked.rows() {
///     println!("{} {} {}", row["qid"], row["docno"], row["rank"]);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn connect(config: RetrieveConfig, params: ConnectionParams) -> Result<ElasticRetriever> {
    config.validate()?;
    let client = ElasticClient::new(params)?;
    ElasticRetriever::new(client, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_validates_config_before_connecting() {
        let config = RetrieveConfig::new("docs", Vec::<String>::new());
        let result = connect(config, ConnectionParams::new("http://127.0.0.1:1")).await;
        assert!(matches!(result, Err(RetrieveError::Config(_))));
    }

    #[tokio::test]
    async fn connect_rejects_bad_url() {
        let config = RetrieveConfig::new("docs", ["body"]);
        let result = connect(config, ConnectionParams::new("::not-a-url")).await;
        assert!(matches!(result, Err(RetrieveError::Config(_))));
    }

    #[tokio::test]
    async fn connect_surfaces_unreachable_backend() {
        let config = RetrieveConfig::new("docs", ["body"]);
        let params = ConnectionParams::new("http://127.0.0.1:1").with_timeout_seconds(2);
        let result = connect(config, params).await;
        assert!(matches!(result, Err(RetrieveError::Backend(_))));
    }
}

//! The batch retriever: group, search, merge, rank.
//!
//! Queries are processed one at a time in first-seen order; each is
//! searched and merged before the next begins. The backend is shared by
//! every query of every batch for the retriever's lifetime.

use std::hash::{Hash, Hasher};

use crate::backend::{BackendIdentity, SearchBackend};
use crate::config::RetrieveConfig;
use crate::dispatch::dispatch;
use crate::elastic::ElasticClient;
use crate::error::{Result, RetrieveError};
use crate::fingerprint::Fingerprint;
use crate::frame::{Frame, Row};
use crate::grouping::{group_queries, QueryRow};
use crate::merge::{check_destinations, merge_hit};
use crate::progress::{ProgressCallback, ProgressEvent};
use crate::rank::assign_ranks;
use crate::types::{DOCNO, RANK, SCORE};

/// A query that failed while the rest of its batch carried on.
#[derive(Debug)]
pub struct QueryFailure {
    /// Identifier of the failed query.
    pub qid: String,
    /// Why it failed.
    pub error: RetrieveError,
}

/// Result of [`ElasticRetriever::transform_isolated`].
#[derive(Debug)]
pub struct PartialRun {
    /// Ranked rows of every query that succeeded.
    pub frame: Frame,
    /// Queries that failed, in batch order.
    pub failures: Vec<QueryFailure>,
}

impl PartialRun {
    /// Whether every query succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Retrieves ranked hits for batches of queries from one index.
///
/// Configuration and backend identity are fixed at construction. The
/// fingerprint is derived once from them and is what [`Hash`] feeds to
/// hashers, so hosts can key result caches by retriever.
pub struct ElasticRetriever<B = ElasticClient> {
    backend: B,
    config: RetrieveConfig,
    identity: BackendIdentity,
    fingerprint: Fingerprint,
    progress: Option<ProgressCallback>,
}

impl<B: SearchBackend> ElasticRetriever<B> {
    /// Display name of this retriever.
    pub const NAME: &'static str = "ElasticRetriever";

    /// Validate `config`, capture the backend's identity and build a retriever.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError::Config`] for an invalid configuration, or the
    /// backend's error if its identity cannot be fetched.
    pub async fn new(backend: B, config: RetrieveConfig) -> Result<Self> {
        config.validate()?;
        let identity = backend.identity().await?;
        tracing::debug!(endpoint = %identity.endpoint, index = %config.index, "retriever ready");
        Self::with_identity(backend, config, identity)
    }

    /// Build a retriever around an identity the caller already captured.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError::Config`] for an invalid configuration.
    pub fn with_identity(backend: B, config: RetrieveConfig, identity: BackendIdentity) -> Result<Self> {
        config.validate()?;
        let fingerprint = Fingerprint::derive(&identity, &config);
        Ok(Self {
            backend,
            config,
            identity,
            fingerprint,
            progress: None,
        })
    }

    /// Receive progress events while batches run. Only verbose retrievers emit.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// The retriever's configuration.
    pub fn config(&self) -> &RetrieveConfig {
        &self.config
    }

    /// The backend this retriever searches.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend identity captured at construction.
    pub fn identity(&self) -> &BackendIdentity {
        &self.identity
    }

    /// Deterministic fingerprint of configuration and backend identity.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Columns of the frame [`transform`](Self::transform) returns for `input`:
    /// the input columns, `docno`, `score`, each extraction destination, `rank`.
    pub fn output_columns(&self, input: &Frame) -> Vec<String> {
        let mut schema = Frame::new(input.columns().iter().map(String::as_str));
        schema.add_column(DOCNO);
        schema.add_column(SCORE);
        for column in self.config.columns.destinations() {
            schema.add_column(column);
        }
        schema.add_column(RANK);
        schema.columns().to_vec()
    }

    /// Retrieve and rank hits for every query in `topics`.
    ///
    /// An empty batch returns an empty frame with the full output schema.
    ///
    /// # Errors
    ///
    /// Any error aborts the whole batch: [`RetrieveError::InvalidInput`] and
    /// [`RetrieveError::MalformedBatch`] before any search is issued (an
    /// extraction column that clashes with an input column is invalid input),
    /// [`RetrieveError::Backend`] and [`RetrieveError::FieldExtraction`] from
    /// the first query that fails.
    pub async fn transform(&self, topics: &Frame) -> Result<Frame> {
        let queries = group_queries(topics)?;
        check_destinations(topics, &self.config.columns)?;
        let mut output = Frame::new(self.output_columns(topics));
        if queries.is_empty() {
            return Ok(output);
        }

        let total = queries.len();
        self.emit(ProgressEvent::BatchStarted { total });

        let mut merged = Vec::new();
        for (position, query) in queries.iter().enumerate() {
            let rows = self.retrieve_query(query).await?;
            self.emit(ProgressEvent::QueryCompleted {
                qid: query.qid_label(),
                hits: rows.len(),
                completed: position + 1,
                total,
            });
            merged.push(rows);
        }

        for row in assign_ranks(merged) {
            output.push_row(row);
        }
        self.emit(ProgressEvent::BatchFinished { rows: output.len() });
        Ok(output)
    }

    /// Like [`transform`](Self::transform), but a query whose search or
    /// extraction fails is reported in [`PartialRun::failures`] instead of
    /// aborting the batch.
    ///
    /// # Errors
    ///
    /// Batch-level problems ([`RetrieveError::InvalidInput`],
    /// [`RetrieveError::MalformedBatch`]) still fail the call.
    pub async fn transform_isolated(&self, topics: &Frame) -> Result<PartialRun> {
        let queries = group_queries(topics)?;
        check_destinations(topics, &self.config.columns)?;
        let mut output = Frame::new(self.output_columns(topics));
        let mut failures = Vec::new();
        if queries.is_empty() {
            return Ok(PartialRun { frame: output, failures });
        }

        let total = queries.len();
        self.emit(ProgressEvent::BatchStarted { total });

        let mut merged = Vec::new();
        for (position, query) in queries.iter().enumerate() {
            match self.retrieve_query(query).await {
                Ok(rows) => {
                    self.emit(ProgressEvent::QueryCompleted {
                        qid: query.qid_label(),
                        hits: rows.len(),
                        completed: position + 1,
                        total,
                    });
                    merged.push(rows);
                }
                Err(error) => {
                    let qid = query.qid_label();
                    tracing::warn!(qid = %qid, error = %error, "query failed");
                    self.emit(ProgressEvent::QueryFailed {
                        qid: qid.clone(),
                        message: error.to_string(),
                    });
                    failures.push(QueryFailure { qid, error });
                }
            }
        }

        for row in assign_ranks(merged) {
            output.push_row(row);
        }
        self.emit(ProgressEvent::BatchFinished { rows: output.len() });
        Ok(PartialRun { frame: output, failures })
    }

    /// Search for one query and merge each hit with its row.
    async fn retrieve_query(&self, query: &QueryRow) -> Result<Vec<Row>> {
        tracing::trace!(qid = %query.qid_label(), query = %query.query, "retrieving");
        let hits = dispatch(&self.backend, &self.config, query).await?;
        tracing::debug!(qid = %query.qid_label(), hits = hits.len(), "query retrieved");
        hits.iter()
            .map(|hit| merge_hit(&query.row, hit, &self.config.columns))
            .collect()
    }

    fn emit(&self, event: ProgressEvent) {
        if !self.config.verbose {
            return;
        }
        if let Some(callback) = &self.progress {
            callback(event);
        }
    }
}

impl<B> Hash for ElasticRetriever<B> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fingerprint.hash(state);
    }
}

impl<B: std::fmt::Debug> std::fmt::Debug for ElasticRetriever<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticRetriever")
            .field("backend", &self.backend)
            .field("config", &self.config)
            .field("fingerprint", &self.fingerprint.to_hex())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

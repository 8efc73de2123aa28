//! Progress events emitted while a batch is retrieved.
//!
//! Decouples the retriever from presentation: a CLI can drive an
//! `indicatif` bar, other hosts can forward events anywhere. Events are
//! only emitted for verbose retrievers and never influence results.

/// Progress events emitted during a batch transform.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A non-empty batch is about to be searched.
    BatchStarted {
        /// Number of queries in the batch.
        total: usize,
    },

    /// One query finished (searched and merged).
    QueryCompleted {
        /// Identifier of the finished query.
        qid: String,
        /// Hits kept for this query.
        hits: usize,
        /// Queries finished so far, including this one.
        completed: usize,
        /// Number of queries in the batch.
        total: usize,
    },

    /// One query failed while running in isolated mode.
    QueryFailed {
        /// Identifier of the failed query.
        qid: String,
        /// Human-readable error description.
        message: String,
    },

    /// The batch finished and ranks were assigned.
    BatchFinished {
        /// Number of ranked output rows.
        rows: usize,
    },
}

/// Callback type for receiving progress events.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

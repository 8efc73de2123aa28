//! esrun: run topic files against an Elasticsearch index.
//!
//! The host side of [`es_retrieve`]: it loads a TOML configuration, reads
//! a batch of topics, hands it to an [`ElasticRetriever`] and writes the
//! ranked rows as a TREC run or JSON lines.

pub mod config;
pub mod error;
pub mod progress;
pub mod run;
pub mod topics;

use std::io::Write;

use es_retrieve::{ElasticRetriever, Frame, SearchBackend};

pub use config::EsrunConfig;
pub use error::{EsrunError, Result};
pub use run::RunFormat;

/// Connect to the cluster described by `config` and build a retriever.
///
/// Verbose configurations get a terminal progress bar.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the cluster is unreachable.
pub async fn build_retriever(config: &EsrunConfig) -> Result<ElasticRetriever> {
    let retriever =
        es_retrieve::connect(config.retrieve.clone(), config.connection.clone()).await?;
    if config.retrieve.verbose {
        let (_bar, callback) = progress::query_progress();
        return Ok(retriever.with_progress(callback));
    }
    Ok(retriever)
}

/// Retrieve `topics` and write the ranked run to `out`.
///
/// With `isolate` set, failing queries are logged and skipped instead of
/// aborting the run. Returns the number of rows written.
///
/// # Errors
///
/// Returns the first retrieval error (or a batch-level one when isolating),
/// or an I/O error from writing.
pub async fn run_topics<B: SearchBackend, W: Write>(
    retriever: &ElasticRetriever<B>,
    topics: &Frame,
    out: &mut W,
    format: RunFormat,
    tag: &str,
    isolate: bool,
) -> Result<usize> {
    tracing::info!(queries = topics.len(), index = %retriever.config().index, "retrieving topics");

    let ranked = if isolate {
        let partial = retriever.transform_isolated(topics).await?;
        for failure in &partial.failures {
            tracing::error!(qid = %failure.qid, error = %failure.error, "query skipped");
        }
        partial.frame
    } else {
        retriever.transform(topics).await?
    };

    run::write_run(out, &ranked, format, tag)?;
    tracing::info!(rows = ranked.len(), "run written");
    Ok(ranked.len())
}

//! Writing ranked runs.

use std::io::Write;

use es_retrieve::{Frame, Row};
use serde_json::Value;

use crate::error::Result;

/// Output format for a ranked run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RunFormat {
    /// TREC run lines: `qid Q0 docno rank score tag`.
    #[default]
    Trec,
    /// One JSON object per ranked row, all columns included.
    Jsonl,
}

fn cell(row: &Row, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Write `frame` to `out` in `format`. `tag` names the run in TREC output.
///
/// # Errors
///
/// Returns an I/O error if writing fails.
pub fn write_run<W: Write>(out: &mut W, frame: &Frame, format: RunFormat, tag: &str) -> Result<()> {
    for row in frame.rows() {
        match format {
            RunFormat::Trec => writeln!(
                out,
                "{} Q0 {} {} {} {tag}",
                cell(row, "qid"),
                cell(row, "docno"),
                cell(row, "rank"),
                cell(row, "score"),
            )?,
            RunFormat::Jsonl => {
                serde_json::to_writer(&mut *out, row).map_err(std::io::Error::from)?;
                writeln!(out)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

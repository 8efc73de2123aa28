//! Topic files: the query batches esrun feeds to the retriever.
//!
//! Two formats are understood:
//! - JSON lines (`.jsonl`, `.json`): one object per line, any columns
//! - TSV (anything else): `qid<TAB>query` per line

use std::path::Path;

use es_retrieve::{Frame, Row};
use serde_json::Value;

use crate::error::{EsrunError, Result};

/// Parse TSV topics. Blank lines are skipped; the query is everything
/// after the first tab.
///
/// # Errors
///
/// Returns [`EsrunError::Topics`] naming the first line without a tab.
pub fn parse_tsv(text: &str) -> Result<Frame> {
    let mut frame = Frame::new(["qid", "query"]);
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((qid, query)) = line.split_once('\t') else {
            return Err(EsrunError::Topics(format!(
                "line {}: expected qid<TAB>query",
                number + 1
            )));
        };
        let mut row = Row::new();
        row.insert("qid".into(), Value::String(qid.trim().to_owned()));
        row.insert("query".into(), Value::String(query.trim().to_owned()));
        frame.push_row(row);
    }
    Ok(frame)
}

/// Parse JSON-lines topics. Blank lines are skipped.
///
/// The result always declares `qid` and `query` first so that an empty
/// file still yields a well-formed (empty) batch.
///
/// # Errors
///
/// Returns [`EsrunError::Topics`] naming the first line that is not a JSON object.
pub fn parse_jsonl(text: &str) -> Result<Frame> {
    let mut frame = Frame::new(["qid", "query"]);
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .map_err(|e| EsrunError::Topics(format!("line {}: {e}", number + 1)))?;
        let Value::Object(row) = value else {
            return Err(EsrunError::Topics(format!(
                "line {}: expected a JSON object",
                number + 1
            )));
        };
        frame.push_row(row);
    }
    Ok(frame)
}

/// Read topics from `path`, choosing the format by extension.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or a topics error if it
/// cannot be parsed.
pub fn read_topics(path: &Path) -> Result<Frame> {
    let text = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("jsonl" | "json") => parse_jsonl(&text),
        _ => parse_tsv(&text),
    }
}

//! Partition an input batch into one query per identifier.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{Result, RetrieveError};
use crate::frame::{Frame, Row};
use crate::types::{QID, QUERY};

/// A single validated query from an input batch.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRow {
    /// The query identifier cell, as given.
    pub qid: Value,
    /// The query text.
    pub query: String,
    /// The full input row, including auxiliary columns.
    pub row: Row,
}

impl QueryRow {
    /// The identifier rendered for messages and grouping: strings verbatim,
    /// other scalars in their JSON form.
    pub fn qid_label(&self) -> String {
        qid_label(&self.qid)
    }
}

/// Render a qid cell as text.
pub(crate) fn qid_label(qid: &Value) -> String {
    match qid {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Key under which two qid cells are considered the same query.
///
/// `1` and `"1"` are different identifiers.
pub(crate) fn qid_key(qid: &Value) -> String {
    qid.to_string()
}

/// Check that `frame` has the columns every batch needs.
///
/// # Errors
///
/// Returns [`RetrieveError::InvalidInput`] naming the first missing column.
pub fn require_query_columns(frame: &Frame) -> Result<()> {
    for column in [QID, QUERY] {
        if !frame.has_column(column) {
            return Err(RetrieveError::InvalidInput(format!(
                "needs '{QID}' and '{QUERY}' columns, missing '{column}'"
            )));
        }
    }
    Ok(())
}

/// Split `frame` into queries, one per distinct qid, in first-seen order.
///
/// Every row is validated before anything is returned, so a malformed
/// batch is rejected before any backend request is made.
///
/// # Errors
///
/// - [`RetrieveError::InvalidInput`] if a column is missing, a qid is not a
///   scalar, or a query is not non-empty text
/// - [`RetrieveError::MalformedBatch`] if a qid appears on more than one row
pub fn group_queries(frame: &Frame) -> Result<Vec<QueryRow>> {
    require_query_columns(frame)?;

    let mut seen: HashSet<String> = HashSet::with_capacity(frame.len());
    let mut groups = Vec::with_capacity(frame.len());

    for (position, row) in frame.rows().iter().enumerate() {
        let qid = match row.get(QID) {
            Some(v @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => v.clone(),
            Some(other) => {
                return Err(RetrieveError::InvalidInput(format!(
                    "row {position}: qid must be a scalar, got {other}"
                )))
            }
            None => {
                return Err(RetrieveError::InvalidInput(format!(
                    "row {position} has no qid"
                )))
            }
        };

        if !seen.insert(qid_key(&qid)) {
            return Err(RetrieveError::MalformedBatch(qid_label(&qid)));
        }

        let query = match row.get(QUERY) {
            Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
            _ => {
                return Err(RetrieveError::InvalidInput(format!(
                    "qid {}: query must be non-empty text",
                    qid_label(&qid)
                )))
            }
        };

        groups.push(QueryRow {
            qid,
            query,
            row: row.clone(),
        });
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(value: Value) -> Frame {
        Frame::from_json(value).expect("table")
    }

    #[test]
    fn groups_preserve_first_seen_order() {
        let groups = group_queries(&frame(json!([
            {"qid": "z", "query": "last letter"},
            {"qid": "a", "query": "first letter"},
            {"qid": "m", "query": "middle letter"},
        ])))
        .expect("groups");
        let qids: Vec<String> = groups.iter().map(QueryRow::qid_label).collect();
        assert_eq!(qids, ["z", "a", "m"]);
    }

    #[test]
    fn auxiliary_columns_are_kept() {
        let groups = group_queries(&frame(json!([
            {"qid": "1", "query": "hello", "lang": "en"},
        ])))
        .expect("groups");
        assert_eq!(groups[0].row["lang"], "en");
        assert_eq!(groups[0].query, "hello");
    }

    #[test]
    fn duplicate_qid_is_malformed() {
        let err = group_queries(&frame(json!([
            {"qid": "1", "query": "a"},
            {"qid": "2", "query": "b"},
            {"qid": "1", "query": "c"},
        ])))
        .unwrap_err();
        assert!(matches!(err, RetrieveError::MalformedBatch(ref q) if q == "1"));
    }

    #[test]
    fn numeric_and_string_qids_are_distinct() {
        let groups = group_queries(&frame(json!([
            {"qid": 1, "query": "a"},
            {"qid": "1", "query": "b"},
        ])))
        .expect("groups");
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn missing_query_column_is_invalid() {
        let err = group_queries(&frame(json!([{"qid": "1", "text": "a"}]))).unwrap_err();
        assert!(matches!(err, RetrieveError::InvalidInput(_)));
        assert!(err.to_string().contains("'query'"));
    }

    #[test]
    fn missing_qid_column_is_invalid_even_when_empty() {
        let err = group_queries(&Frame::new(["query"])).unwrap_err();
        assert!(err.to_string().contains("'qid'"));
    }

    #[test]
    fn empty_frame_yields_no_groups() {
        let groups = group_queries(&Frame::new(["qid", "query"])).expect("groups");
        assert!(groups.is_empty());
    }

    #[test]
    fn row_without_qid_is_invalid() {
        let err = group_queries(&frame(json!([
            {"qid": "1", "query": "a"},
            {"query": "b"},
        ])))
        .unwrap_err();
        assert!(err.to_string().contains("row 1 has no qid"));
    }

    #[test]
    fn non_scalar_qid_is_invalid() {
        let err = group_queries(&frame(json!([{"qid": ["1"], "query": "a"}]))).unwrap_err();
        assert!(err.to_string().contains("scalar"));
    }

    #[test]
    fn blank_query_is_invalid() {
        let err = group_queries(&frame(json!([{"qid": "1", "query": "   "}]))).unwrap_err();
        assert!(err.to_string().contains("qid 1"));
    }
}

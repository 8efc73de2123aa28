//! Tabular batches passed into and out of the retriever.
//!
//! A [`Frame`] is an ordered list of column names plus rows. Rows are
//! ordered JSON objects so that arbitrary auxiliary columns survive the
//! round trip through retrieval unchanged.

use serde_json::{Map, Value};

use crate::error::{Result, RetrieveError};

/// One record of a frame: column name to cell value, in column order.
pub type Row = Map<String, Value>;

/// An ordered table of rows sharing a column schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Frame {
    /// Create an empty frame with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut frame = Self::default();
        for column in columns {
            frame.add_column(column.into());
        }
        frame
    }

    /// Build a frame from rows. Columns are collected in first-seen order.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut frame = Self::default();
        for row in rows {
            frame.push_row(row);
        }
        frame
    }

    /// Build a frame from a JSON array of objects.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieveError::InvalidInput`] if `value` is not an array,
    /// or any element is not an object.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(RetrieveError::InvalidInput(
                "expected a table (JSON array of objects)".into(),
            ));
        };

        let mut rows = Vec::with_capacity(items.len());
        for (position, item) in items.into_iter().enumerate() {
            match item {
                Value::Object(row) => rows.push(row),
                other => {
                    return Err(RetrieveError::InvalidInput(format!(
                        "row {position} is not an object: {other}"
                    )))
                }
            }
        }
        Ok(Self::from_rows(rows))
    }

    /// Append a row, extending the column list with any new columns.
    pub fn push_row(&mut self, row: Row) {
        for key in row.keys() {
            if !self.has_column(key) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(row);
    }

    /// Append a column to the schema if it is not already present.
    pub fn add_column(&mut self, column: impl Into<String>) {
        let column = column.into();
        if !self.has_column(&column) {
            self.columns.push(column);
        }
    }

    /// Whether the schema contains `column`.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Column names in schema order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in frame order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consume the frame, returning its rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the frame as a JSON array of row objects.
    pub fn to_json(&self) -> Value {
        Value::Array(self.rows.iter().cloned().map(Value::Object).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test rows are objects"),
        }
    }

    #[test]
    fn new_frame_has_schema_but_no_rows() {
        let frame = Frame::new(["qid", "query"]);
        assert_eq!(frame.columns(), ["qid", "query"]);
        assert!(frame.is_empty());
    }

    #[test]
    fn new_frame_ignores_duplicate_columns() {
        let frame = Frame::new(["qid", "qid", "query"]);
        assert_eq!(frame.columns(), ["qid", "query"]);
    }

    #[test]
    fn columns_are_collected_in_first_seen_order() {
        let frame = Frame::from_rows(vec![
            row(json!({"qid": "1", "query": "a"})),
            row(json!({"qid": "2", "query": "b", "lang": "en"})),
        ]);
        assert_eq!(frame.columns(), ["qid", "query", "lang"]);
        assert_eq!(frame.len(), 2);
    }

    #[test]
    fn from_json_rejects_non_array() {
        let err = Frame::from_json(json!({"qid": "1"})).unwrap_err();
        assert!(matches!(err, RetrieveError::InvalidInput(_)));
    }

    #[test]
    fn from_json_rejects_non_object_rows() {
        let err = Frame::from_json(json!([{"qid": "1"}, 42])).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn from_json_preserves_row_key_order() {
        let frame = Frame::from_json(json!([{"query": "a", "qid": "1"}])).expect("table");
        let keys: Vec<&String> = frame.rows()[0].keys().collect();
        assert_eq!(keys, ["query", "qid"]);
        assert_eq!(frame.to_json(), json!([{"query": "a", "qid": "1"}]));
    }
}

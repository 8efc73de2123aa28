//! Combine a query row with one hit into an output row.

use serde_json::Value;

use crate::config::ExtractionMap;
use crate::error::{Result, RetrieveError};
use crate::frame::{Frame, Row};
use crate::types::{Hit, DOCNO, SCORE};

/// Follow a dotted `path` through nested objects in `source`.
///
/// Returns `None` as soon as a component is missing or a non-object is
/// reached before the path is exhausted.
pub fn extract_path<'a>(source: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(source, |value, component| value.as_object()?.get(component))
}

/// Check that no extraction destination is already a column of `input`.
///
/// # Errors
///
/// Returns [`RetrieveError::InvalidInput`] naming the first clashing column.
pub fn check_destinations(input: &Frame, columns: &ExtractionMap) -> Result<()> {
    match columns.destinations().find(|column| input.has_column(column)) {
        Some(column) => Err(RetrieveError::InvalidInput(format!(
            "extraction column '{column}' would overwrite an input column"
        ))),
        None => Ok(()),
    }
}

/// Build the output row for `hit` retrieved by the query in `row`.
///
/// The query row's columns come first, then `docno` and `score`, then one
/// column per extraction in map order. Each extraction writes only its own
/// destination column.
///
/// # Errors
///
/// Returns [`RetrieveError::FieldExtraction`] naming the path and hit if any
/// configured path is absent from the hit's source.
pub fn merge_hit(row: &Row, hit: &Hit, columns: &ExtractionMap) -> Result<Row> {
    let mut merged = row.clone();
    merged.insert(DOCNO.into(), Value::String(hit.id.clone()));
    merged.insert(SCORE.into(), Value::from(hit.score));

    for (path, column) in columns.iter() {
        let value = extract_path(&hit.source, path).ok_or_else(|| RetrieveError::FieldExtraction {
            path: path.to_owned(),
            docno: hit.id.clone(),
        })?;
        merged.insert(column.to_owned(), value.clone());
    }
    Ok(merged)
}

//! Retrieval configuration.
//!
//! [`RetrieveConfig`] names the target index, the fields a query is matched
//! against, which nested source values are copied into output columns, and
//! how many hits are kept per query. A retriever takes ownership of its
//! configuration at construction and never mutates it afterwards.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RetrieveError;
use crate::types::RESERVED_COLUMNS;

/// Default number of hits requested per query.
pub const DEFAULT_NUM_RESULTS: usize = 10;

/// Ordered mapping from dotted source path to destination column name.
///
/// Entries keep insertion (or document) order, which is also the order in
/// which the destination columns appear in the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionMap {
    entries: Vec<(String, String)>,
}

impl ExtractionMap {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `path → column`, replacing the destination of an existing path.
    pub fn insert(&mut self, path: impl Into<String>, column: impl Into<String>) {
        let path = path.into();
        let column = column.into();
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = column,
            None => self.entries.push((path, column)),
        }
    }

    /// Iterate `(path, column)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    /// Destination column names in order.
    pub fn destinations(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, c)| c.as_str())
    }

    /// Number of configured extractions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no extractions are configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P, C> FromIterator<(P, C)> for ExtractionMap
where
    P: Into<String>,
    C: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (path, column) in iter {
            map.insert(path, column);
        }
        map
    }
}

impl Serialize for ExtractionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for ExtractionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ExtractionMapVisitor;

        impl<'de> Visitor<'de> for ExtractionMapVisitor {
            type Value = ExtractionMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of source path to column name")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = ExtractionMap::new();
                while let Some((path, column)) = access.next_entry::<String, String>()? {
                    map.insert(path, column);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ExtractionMapVisitor)
    }
}

fn default_num_results() -> Option<usize> {
    Some(DEFAULT_NUM_RESULTS)
}

/// Configuration for one retriever instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieveConfig {
    /// Name of the index to search.
    pub index: String,
    /// Fields the query text is matched against, in order.
    pub fields: Vec<String>,
    /// Nested source values to copy into output columns.
    #[serde(default)]
    pub columns: ExtractionMap,
    /// Maximum hits kept per query. `None` defers to the backend default.
    #[serde(default = "default_num_results")]
    pub num_results: Option<usize>,
    /// Report per-query progress while a batch runs.
    #[serde(default)]
    pub verbose: bool,
}

impl RetrieveConfig {
    /// Create a configuration searching `fields` of `index` with defaults
    /// for everything else.
    pub fn new<I, S>(index: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index: index.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            columns: ExtractionMap::new(),
            num_results: default_num_results(),
            verbose: false,
        }
    }

    /// Set the extraction map.
    pub fn with_columns(mut self, columns: ExtractionMap) -> Self {
        self.columns = columns;
        self
    }

    /// Set the per-query result cap (`None` for the backend default).
    pub fn with_num_results(mut self, num_results: Option<usize>) -> Self {
        self.num_results = num_results;
        self
    }

    /// Enable or disable progress reporting.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `index` must not be empty
    /// - `fields` must not be empty, nor contain empty names
    /// - `num_results`, when set, must be greater than 0
    /// - extraction paths must not be empty or contain empty components
    /// - destination columns must be unique and not reuse `qid`, `query`,
    ///   `docno`, `score` or `rank`
    pub fn validate(&self) -> Result<(), RetrieveError> {
        if self.index.trim().is_empty() {
            return Err(RetrieveError::Config("index must not be empty".into()));
        }
        if self.fields.is_empty() {
            return Err(RetrieveError::Config(
                "at least one search field must be configured".into(),
            ));
        }
        if self.fields.iter().any(|f| f.trim().is_empty()) {
            return Err(RetrieveError::Config(
                "search field names must not be empty".into(),
            ));
        }
        if self.num_results == Some(0) {
            return Err(RetrieveError::Config(
                "num_results must be greater than 0".into(),
            ));
        }

        let mut seen: Vec<&str> = Vec::with_capacity(self.columns.len());
        for (path, column) in self.columns.iter() {
            if path.split('.').any(str::is_empty) {
                return Err(RetrieveError::Config(format!(
                    "invalid extraction path '{path}'"
                )));
            }
            if column.is_empty() {
                return Err(RetrieveError::Config(format!(
                    "extraction path '{path}' has an empty column name"
                )));
            }
            if RESERVED_COLUMNS.contains(&column) {
                return Err(RetrieveError::Config(format!(
                    "column '{column}' is reserved by the retriever"
                )));
            }
            if seen.contains(&column) {
                return Err(RetrieveError::Config(format!(
                    "column '{column}' is the destination of more than one path"
                )));
            }
            seen.push(column);
        }
        Ok(())
    }
}

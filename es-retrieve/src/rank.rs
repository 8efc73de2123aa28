//! Dense per-query ranking of merged rows.
//!
//! Each query's rows are stable-sorted by descending score and numbered
//! `0..n`. Ties keep the order the backend returned them in. Groups are
//! emitted in the order given; scores are never compared across queries.

use serde_json::Value;

use crate::frame::Row;
use crate::types::{RANK, SCORE};

fn score_of(row: &Row) -> f64 {
    row.get(SCORE).and_then(Value::as_f64).unwrap_or(f64::NEG_INFINITY)
}

/// Sort `rows` by descending score and set the `rank` column to 0, 1, 2, ...
///
/// All rows are assumed to belong to one query.
pub fn rank_group(mut rows: Vec<Row>) -> Vec<Row> {
    rows.sort_by(|a, b| score_of(b).total_cmp(&score_of(a)));
    for (rank, row) in rows.iter_mut().enumerate() {
        row.insert(RANK.into(), Value::from(rank as u64));
    }
    rows
}

/// Rank each query's rows and concatenate them in group order.
///
/// Groups come from the batch grouping, one per query, so ranking never
/// depends on what the `qid` cell of a merged row holds.
pub fn assign_ranks(groups: Vec<Vec<Row>>) -> Vec<Row> {
    groups.into_iter().flat_map(rank_group).collect()
}

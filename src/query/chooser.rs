//! Selection strategy chooser
//!
//! Routes a conjunctive equality predicate through whichever bitmap indexes
//! exist for its columns, falling back to a linear scan when none do.

use std::collections::HashMap;
use std::fmt;

use crate::index::{BitVector, BitmapIndex};
use crate::table::{Record, Table};

use super::{Condition, Predicate};

/// Index-usage strategy for a predicate with `k` of `m` conditions indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// k == m: intersect every condition's positions
    AllIndexed,

    /// k == 1 < m: one index for candidates, filter the rest linearly
    SingleIndexed,

    /// 1 < k < m: intersect the indexed conditions, filter the rest
    PartialIndexed,

    /// k == 0: linear scan
    Unindexed,
}

impl Strategy {
    /// Pick a strategy from the indexed/total condition counts
    pub fn choose(indexed: usize, total: usize) -> Self {
        if indexed == 0 {
            Strategy::Unindexed
        } else if indexed == total {
            Strategy::AllIndexed
        } else if indexed == 1 {
            Strategy::SingleIndexed
        } else {
            Strategy::PartialIndexed
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::AllIndexed => "all-indexed",
            Strategy::SingleIndexed => "single-indexed",
            Strategy::PartialIndexed => "partial-indexed",
            Strategy::Unindexed => "unindexed",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of an indexed selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub strategy: Strategy,
    pub records: Vec<Record>,
}

/// Run `predicate` against `table`, using any of `indexes` keyed by column
///
/// Index-derived results come back in ascending global position; the
/// unindexed path keeps scan order. Appends one trace entry naming the
/// strategy and result count.
pub fn select_indexed(
    table: &mut Table,
    predicate: &Predicate,
    indexes: &HashMap<String, BitmapIndex>,
) -> Selection {
    let (indexed, residual): (Vec<&Condition>, Vec<&Condition>) = predicate
        .conditions()
        .iter()
        .partition(|c| indexes.contains_key(&c.column));

    let strategy = Strategy::choose(indexed.len(), predicate.len());
    tracing::debug!(
        table = table.name(),
        indexed = indexed.len(),
        total = predicate.len(),
        %strategy,
        "choosing selection strategy"
    );

    let records = match strategy {
        Strategy::Unindexed => table.filter(predicate),
        Strategy::AllIndexed => {
            let candidates = intersect(&indexed, indexes);
            fetch(table, &candidates)
        }
        Strategy::SingleIndexed | Strategy::PartialIndexed => {
            let candidates = intersect(&indexed, indexes);
            match table.bind(residual.iter().copied()) {
                Some(bound) => fetch(table, &candidates)
                    .into_iter()
                    .filter(|r| Table::matches_bound(r, &bound))
                    .collect(),
                // unknown column in a residual condition
                None => Vec::new(),
            }
        }
    };

    table.push_trace(format!(
        "Index selection: {}, found {} records",
        strategy,
        records.len()
    ));

    Selection { strategy, records }
}

/// Records holding `value` according to a single index
///
/// Silent: no trace entry.
pub fn select_by_index(table: &Table, index: &BitmapIndex, value: &str) -> Vec<Record> {
    index
        .select(value)
        .into_iter()
        .filter_map(|pos| table.record_at_position(pos).cloned())
        .collect()
}

/// AND together the position sets of every indexed condition
fn intersect(conditions: &[&Condition], indexes: &HashMap<String, BitmapIndex>) -> BitVector {
    let mut sets = conditions.iter().map(|c| {
        indexes
            .get(&c.column)
            .and_then(|index| index.vector(&c.value))
            .cloned()
            .unwrap_or_default()
    });

    let first = sets.next().unwrap_or_default();
    sets.fold(first, |acc, bits| acc.intersect(&bits))
}

/// Translate positions to `(page, offset)` and fetch, ascending
///
/// Positions past the end of the table (stale index) are skipped.
fn fetch(table: &Table, positions: &BitVector) -> Vec<Record> {
    positions
        .ones()
        .filter_map(|pos| {
            let (page_number, offset) = table.coordinate_of(pos);
            table.record_at(page_number, offset).cloned()
        })
        .collect()
}

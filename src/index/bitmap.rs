//! Bitmap index implementation
//!
//! One bit vector per distinct column value, aligned to table insertion order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::table::Table;

use super::BitVector;

/// Per-column bitmap index
///
/// ## Invariants
/// - Every vector has logical length `total_records`
/// - Each position `0..total_records` is set in exactly one vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitmapIndex {
    /// Indexed column name
    column: String,

    /// Distinct value → slot in `bitmaps`
    value_ids: BTreeMap<String, usize>,

    /// Bit vectors, one per distinct value, in first-seen order
    bitmaps: Vec<BitVector>,

    /// Records processed so far
    total_records: usize,
}

impl BitmapIndex {
    /// Create an empty index for `column`
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value_ids: BTreeMap::new(),
            bitmaps: Vec::new(),
            total_records: 0,
        }
    }

    /// Build an index by scanning every record of `table`
    ///
    /// Returns `None` if the table has no such column.
    pub fn build(table: &Table, column: &str) -> Option<Self> {
        let position = table.column_position(column)?;

        let mut index = Self::new(column);
        for record in table.records() {
            index.insert(&record[position]);
        }
        Some(index)
    }

    /// Record the next value in insertion order
    ///
    /// A value seen for the first time gets a vector that reads as zero for
    /// every earlier record.
    pub fn insert(&mut self, value: &str) {
        let id = match self.value_ids.get(value) {
            Some(&id) => id,
            None => {
                let id = self.bitmaps.len();
                self.value_ids.insert(value.to_string(), id);
                self.bitmaps.push(BitVector::new());
                id
            }
        };

        self.bitmaps[id].set(self.total_records);
        self.total_records += 1;
    }

    /// Ascending positions holding `value`; empty if never observed
    pub fn select(&self, value: &str) -> Vec<usize> {
        self.vector(value)
            .map(|bits| bits.ones().collect())
            .unwrap_or_default()
    }

    /// The bit vector for `value`
    pub fn vector(&self, value: &str) -> Option<&BitVector> {
        self.value_ids.get(value).map(|&id| &self.bitmaps[id])
    }

    /// `"0"`/`"1"` string of length `total_records` for `value`
    pub fn bit_string(&self, value: &str) -> Option<String> {
        self.vector(value)
            .map(|bits| bits.to_bit_string(self.total_records))
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn total_records(&self) -> usize {
        self.total_records
    }

    pub fn distinct_count(&self) -> usize {
        self.bitmaps.len()
    }

    /// Distinct values in sorted order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.value_ids.keys().map(String::as_str)
    }
}

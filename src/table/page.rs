//! Page implementation
//!
//! A bounded ordered run of records. Capacity is enforced by the owning table.

use serde::{Deserialize, Serialize};

use super::Record;

/// Ordered sequence of records; the unit of persistence and recovery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    records: Vec<Record>,
}

impl Page {
    /// Create a new empty page
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record (no capacity check)
    pub fn insert(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Get the record at `offset`
    pub fn get(&self, offset: usize) -> Option<&Record> {
        self.records.get(offset)
    }

    /// Whether a field-wise equal record is already stored here
    pub fn contains(&self, record: &[String]) -> bool {
        self.records.iter().any(|r| r.as_slice() == record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order
    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

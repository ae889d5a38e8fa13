//! Predicate definitions
//!
//! Conjunctions of `column = value` equality conditions.

use crate::error::{FileTableError, Result};

/// A single `column = value` condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: String,
    pub value: String,
}

/// Conjunction of equality conditions, in caller order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    /// Pair up `columns[i] = values[i]`
    ///
    /// Fails fast when the slices differ in length or are empty.
    pub fn new<C: AsRef<str>, V: AsRef<str>>(columns: &[C], values: &[V]) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(FileTableError::PredicateLengthMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }
        if columns.is_empty() {
            return Err(FileTableError::EmptyPredicate);
        }

        let conditions = columns
            .iter()
            .zip(values)
            .map(|(c, v)| Condition {
                column: c.as_ref().to_string(),
                value: v.as_ref().to_string(),
            })
            .collect();

        Ok(Self { conditions })
    }

    /// Single-condition predicate
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            conditions: vec![Condition {
                column: column.into(),
                value: value.into(),
            }],
        }
    }

    /// Add another condition to the conjunction
    pub fn and(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push(Condition {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Column names in condition order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(|c| c.column.as_str())
    }

    /// `[a, b]->[x, y]` rendering used in trace entries
    pub fn describe(&self) -> String {
        let columns: Vec<&str> = self.conditions.iter().map(|c| c.column.as_str()).collect();
        let values: Vec<&str> = self.conditions.iter().map(|c| c.value.as_str()).collect();
        format!("[{}]->[{}]", columns.join(", "), values.join(", "))
    }
}

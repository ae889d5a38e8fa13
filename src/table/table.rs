//! Table implementation
//!
//! Pages, schema, indexed-column set and trace log for one table.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{FileTableError, Result};
use crate::query::{Condition, Predicate};

use super::{Page, Record};

/// A named table of text records split into fixed-capacity pages
///
/// ## Invariants
/// - Every stored record has exactly `columns.len()` fields
/// - Every page but the last holds exactly `page_capacity` records
///   (recovery into a non-existent page may pad with empty pages)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name (persistence key)
    name: String,

    /// Column names, positionally aligned with record fields
    columns: Vec<String>,

    /// Max records per page
    page_capacity: usize,

    /// Pages in order
    pages: Vec<Page>,

    /// Columns with a registered bitmap index, in registration order
    indexed_columns: Vec<String>,

    /// Append-only operation log
    trace: Vec<String>,
}

impl Table {
    /// Create an empty table
    ///
    /// A capacity of 0 is treated as 1.
    pub fn new<S: AsRef<str>>(name: impl Into<String>, columns: &[S], page_capacity: usize) -> Self {
        let name = name.into();
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();

        let mut table = Self {
            trace: Vec::new(),
            indexed_columns: Vec::new(),
            pages: Vec::new(),
            page_capacity: page_capacity.max(1),
            columns,
            name,
        };
        table.push_trace(format!(
            "Table created name:{}, columnsNames:[{}]",
            table.name,
            table.columns.join(", ")
        ));
        table
    }

    // =========================================================================
    // Schema & Layout
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn page_capacity(&self) -> usize {
        self.page_capacity
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, page_number: usize) -> Option<&Page> {
        self.pages.get(page_number)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total records across all pages
    pub fn record_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    /// Position of `column` in the schema
    pub fn column_position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Map a global position to `(page, offset)`
    pub fn coordinate_of(&self, position: usize) -> (usize, usize) {
        (position / self.page_capacity, position % self.page_capacity)
    }

    /// Global positions a page covers: `[p * cap, min((p + 1) * cap, N))`
    pub fn page_range(&self, page_number: usize) -> Range<usize> {
        let total = self.record_count();
        let start = (page_number * self.page_capacity).min(total);
        let end = ((page_number + 1) * self.page_capacity).min(total);
        start..end
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Append a record, opening a new page when the last one is full
    ///
    /// Returns the page number the record landed in.
    pub fn insert(&mut self, record: Record) -> Result<usize> {
        self.check_arity(&record)?;

        let needs_page = self
            .pages
            .last()
            .map_or(true, |page| page.len() >= self.page_capacity);
        if needs_page {
            self.pages.push(Page::new());
        }

        let page_number = self.pages.len() - 1;
        let entry = format!("Inserted:[{}], at page number:{}", record.join(", "), page_number);
        self.pages[page_number].insert(record);
        self.push_trace(entry);

        Ok(page_number)
    }

    /// Put `record` back into `page_number`
    ///
    /// Missing intermediate pages are created empty. A record already held by
    /// that page is left as is.
    pub fn recover_record(&mut self, record: Record, page_number: usize) -> Result<()> {
        self.check_arity(&record)?;

        while self.pages.len() <= page_number {
            self.pages.push(Page::new());
        }

        let page = &mut self.pages[page_number];
        if !page.contains(&record) {
            page.insert(record);
        }
        Ok(())
    }

    /// Mark a column as indexed; returns false if it already was
    pub fn add_indexed_column(&mut self, column: impl Into<String>) -> bool {
        let column = column.into();
        if self.indexed_columns.contains(&column) {
            return false;
        }
        self.indexed_columns.push(column);
        true
    }

    pub fn indexed_columns(&self) -> &[String] {
        &self.indexed_columns
    }

    pub fn is_indexed(&self, column: &str) -> bool {
        self.indexed_columns.iter().any(|c| c == column)
    }

    fn check_arity(&self, record: &[String]) -> Result<()> {
        if record.len() != self.columns.len() {
            return Err(FileTableError::ArityMismatch {
                expected: self.columns.len(),
                actual: record.len(),
            });
        }
        Ok(())
    }

    // =========================================================================
    // Silent Reads (no trace entry)
    // =========================================================================

    /// All records in page order, then insertion order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.pages.iter().flat_map(|page| page.records().iter())
    }

    pub fn record_at(&self, page_number: usize, offset: usize) -> Option<&Record> {
        self.pages.get(page_number)?.get(offset)
    }

    /// Record at a global position
    pub fn record_at_position(&self, position: usize) -> Option<&Record> {
        let (page_number, offset) = self.coordinate_of(position);
        self.record_at(page_number, offset)
    }

    /// Global position of the first field-wise equal record
    pub fn position_of(&self, record: &[String]) -> Option<usize> {
        self.records().position(|r| r.as_slice() == record)
    }

    /// Resolve conditions to `(field index, value)` pairs
    ///
    /// `None` if any condition names a column this table lacks.
    pub(crate) fn bind<'a, I>(&self, conditions: I) -> Option<Vec<(usize, &'a str)>>
    where
        I: IntoIterator<Item = &'a Condition>,
    {
        conditions
            .into_iter()
            .map(|c| Some((self.column_position(&c.column)?, c.value.as_str())))
            .collect()
    }

    pub(crate) fn matches_bound(record: &[String], bound: &[(usize, &str)]) -> bool {
        bound.iter().all(|(i, value)| record[*i] == *value)
    }

    /// Linear scan in table order
    pub fn filter(&self, predicate: &Predicate) -> Vec<Record> {
        self.scan(predicate).0
    }

    /// Matching records plus `(page, match count)` for pages with hits
    ///
    /// A condition on an unknown column matches nothing.
    fn scan(&self, predicate: &Predicate) -> (Vec<Record>, Vec<(usize, usize)>) {
        let mut result = Vec::new();
        let mut per_page = Vec::new();

        let Some(bound) = self.bind(predicate.conditions()) else {
            return (result, per_page);
        };

        for (page_number, page) in self.pages.iter().enumerate() {
            let before = result.len();
            result.extend(
                page.records()
                    .iter()
                    .filter(|r| Self::matches_bound(r, &bound))
                    .cloned(),
            );
            if result.len() > before {
                per_page.push((page_number, result.len() - before));
            }
        }
        (result, per_page)
    }

    // =========================================================================
    // Traced Reads
    // =========================================================================

    /// Full scan
    pub fn select_all(&mut self) -> Vec<Record> {
        let result: Vec<Record> = self.records().cloned().collect();
        self.push_trace(format!(
            "Select all pages:{}, records:{}",
            self.pages.len(),
            result.len()
        ));
        result
    }

    /// Point lookup; empty if the coordinate is out of range
    pub fn select_at(&mut self, page_number: usize, offset: usize) -> Vec<Record> {
        let result: Vec<Record> = self.record_at(page_number, offset).cloned().into_iter().collect();
        self.push_trace(format!(
            "Select pointer page:{}, record:{}, total output count:{}",
            page_number,
            offset,
            result.len()
        ));
        result
    }

    /// Linear scan for records satisfying every condition
    pub fn select_where(&mut self, predicate: &Predicate) -> Vec<Record> {
        let (result, per_page) = self.scan(predicate);

        let per_page: Vec<String> = per_page
            .iter()
            .map(|(page, count)| format!("[{}, {}]", page, count))
            .collect();
        self.push_trace(format!(
            "Select condition:{}, Records per page:[{}], records:{}",
            predicate.describe(),
            per_page.join(", "),
            result.len()
        ));
        result
    }

    // =========================================================================
    // Trace
    // =========================================================================

    pub fn push_trace(&mut self, entry: impl Into<String>) {
        self.trace.push(entry.into());
    }

    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// Every entry, newline-joined, followed by a layout summary line
    pub fn full_trace(&self) -> String {
        let mut out = String::new();
        for entry in &self.trace {
            out.push_str(entry);
            out.push('\n');
        }
        out.push_str(&format!(
            "Pages Count: {}, Records Count: {}, Indexed Columns: [{}]",
            self.pages.len(),
            self.record_count(),
            self.indexed_columns.join(", ")
        ));
        out
    }

    /// Most recent entry, or an empty string
    pub fn last_trace(&self) -> String {
        self.trace.last().cloned().unwrap_or_default()
    }
}

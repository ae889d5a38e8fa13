//! Table Module
//!
//! Paged, append-only record storage.
//!
//! ## Responsibilities
//! - Append records into fixed-capacity pages
//! - Address records by (page, offset) or by global position
//! - Linear predicate scans
//! - Reinsert records into a given page during recovery
//! - Keep a per-table trace of operations
//!
//! ## Addressing
//! ```text
//! global position = page * capacity + offset
//!
//! capacity = 2:   page 0      page 1      page 2
//!               ┌────┬────┐ ┌────┬────┐ ┌────┐
//!               │ r0 │ r1 │ │ r2 │ r3 │ │ r4 │
//!               └────┴────┘ └────┴────┘ └────┘
//! ```
//! The mapping holds while every page but the last is full.

mod page;
mod table;

pub use page::Page;
pub use table::Table;

/// A record: one text field per table column
pub type Record = Vec<String>;

/// Build a [`Record`] from string slices
pub fn record<S: AsRef<str>>(fields: &[S]) -> Record {
    fields.iter().map(|f| f.as_ref().to_string()).collect()
}

//! Store Module
//!
//! Key-value persistence for tables, bitmap indexes and page snapshots.
//!
//! ## Responsibilities
//! - Store and load opaque blobs by [`StoreKey`]
//! - Remove single keys, reset everything
//! - Summarize persisted keys for diagnostics
//!
//! ## Keys
//! ```text
//! Table(name)              → table metadata, pages and trace
//! Index { table, column }  → bitmap index for one column
//! Page  { table, page }    → snapshot of one page
//! ```
//!
//! Implementations guard their own state, but provide no isolation across
//! operations: callers serialize access per table name.

mod codec;
mod file;
mod key;
mod memory;

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::error::Result;

pub use codec::{decode, decode_framed, encode, encode_framed, FOOTER_SIZE, HEADER_SIZE, MAGIC, VERSION};
pub use file::FileStore;
pub use key::StoreKey;
pub use memory::MemoryStore;

/// Persistence capability consumed by the engine
pub trait Store {
    /// Persist `blob` under `key`, replacing any previous value
    fn store(&self, key: &StoreKey, blob: Bytes) -> Result<()>;

    /// Load the blob under `key`, `None` if absent
    fn load(&self, key: &StoreKey) -> Result<Option<Bytes>>;

    /// Remove `key`; returns whether it existed
    fn remove(&self, key: &StoreKey) -> Result<bool>;

    /// Remove every key
    fn reset(&self) -> Result<()>;

    /// Every persisted key, sorted
    fn keys(&self) -> Result<Vec<StoreKey>>;

    /// Human-readable summary of persisted keys, grouped by table
    fn trace(&self) -> Result<String> {
        let keys = self.keys()?;
        if keys.is_empty() {
            return Ok("Store is empty".to_string());
        }

        #[derive(Default)]
        struct Summary<'a> {
            has_table: bool,
            pages: Vec<usize>,
            indexes: Vec<&'a str>,
        }

        let mut tables: BTreeMap<&str, Summary<'_>> = BTreeMap::new();
        for key in &keys {
            let summary = tables.entry(key.table_name()).or_default();
            match key {
                StoreKey::Table(_) => summary.has_table = true,
                StoreKey::Index { column, .. } => summary.indexes.push(column.as_str()),
                StoreKey::Page { page, .. } => summary.pages.push(*page),
            }
        }

        let lines: Vec<String> = tables
            .iter()
            .map(|(name, s)| {
                format!(
                    "{}: table {}, pages {:?}, indexes [{}]",
                    name,
                    if s.has_table { "present" } else { "missing" },
                    s.pages,
                    s.indexes.join(", ")
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }
}

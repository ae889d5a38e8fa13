//! Engine Module
//!
//! The operation surface that coordinates tables, indexes and the store.
//!
//! ## Responsibilities
//! - Run every operation as one load → operate → store cycle
//! - Keep page snapshots in step with inserts and recovery
//! - Build and load bitmap indexes
//! - Resolve absent tables, columns and indexes to empty results

use std::collections::HashMap;
use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::index::BitmapIndex;
use crate::query::{self, Predicate, Selection, Strategy};
use crate::recovery::PageRecovery;
use crate::store::{decode, encode, FileStore, MemoryStore, Store, StoreKey};
use crate::table::{record, Page, Record, Table};

/// The main table engine
///
/// ## Concurrency Model
///
/// None. Each call loads the whole table, mutates it and stores it back.
/// Two calls racing on the same table name can lose each other's writes;
/// callers must serialize access per table.
///
/// ## Persistence
///
/// - `Table(name)` is rewritten by every operation that touches the trace
/// - `Page { name, p }` is written when a record lands in page `p` and when
///   page `p` is recovered
/// - `Index { name, column }` is written by `create_bitmap_index` only, so an
///   index goes stale when the table grows
pub struct Engine<S: Store = FileStore> {
    /// Engine configuration
    config: Config,

    /// Persistence backend
    store: S,
}

impl Engine<FileStore> {
    /// Open or create an engine backed by files under `config.data_dir`
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let store = FileStore::open(&config.data_dir, config.sync_strategy)?;
        tracing::info!(
            data_dir = %config.data_dir.display(),
            page_capacity = config.page_capacity,
            "engine opened"
        );
        Ok(Self { config, store })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }
}

impl Engine<MemoryStore> {
    /// Engine over a volatile in-memory store
    pub fn in_memory(config: Config) -> Result<Self> {
        Self::with_store(config, MemoryStore::new())
    }
}

impl<S: Store> Engine<S> {
    /// Engine over any store
    pub fn with_store(config: Config, store: S) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, store })
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Create (or replace) a table
    ///
    /// Replacing drops every key of the old table, indexes and pages included.
    pub fn create_table<C: AsRef<str>>(&self, name: &str, columns: &[C]) -> Result<()> {
        if self.drop_table(name)? {
            tracing::warn!(table = name, "replacing existing table");
        }

        let table = Table::new(name, columns, self.config.page_capacity);
        self.save_table(&table)?;
        tracing::debug!(table = name, columns = columns.len(), "table created");
        Ok(())
    }

    /// Append a record
    ///
    /// Fails with `ArityMismatch` if the field count differs from the column
    /// count. A missing table is a no-op.
    pub fn insert<F: AsRef<str>>(&self, name: &str, fields: &[F]) -> Result<()> {
        let Some(mut table) = self.load_table(name)? else {
            tracing::warn!(table = name, "insert into missing table ignored");
            return Ok(());
        };

        let page_number = table.insert(record(fields))?;
        self.save_page(&table, page_number)?;
        self.save_table(&table)
    }

    /// Remove the table and every index and page snapshot belonging to it
    pub fn drop_table(&self, name: &str) -> Result<bool> {
        let keys: Vec<StoreKey> = self
            .store
            .keys()?
            .into_iter()
            .filter(|k| k.table_name() == name)
            .collect();

        let mut existed = false;
        for key in &keys {
            existed |= self.store.remove(key)?;
        }
        Ok(existed)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Every record, in insertion order
    pub fn select_all(&self, name: &str) -> Result<Vec<Record>> {
        self.with_table(name, |table| Ok(table.select_all()))
    }

    /// The record at `(page, offset)`, or nothing
    pub fn select_at(&self, name: &str, page: usize, offset: usize) -> Result<Vec<Record>> {
        self.with_table(name, |table| Ok(table.select_at(page, offset)))
    }

    /// Linear scan for `columns[i] == values[i]` for all `i`
    pub fn select_where<C: AsRef<str>, V: AsRef<str>>(
        &self,
        name: &str,
        columns: &[C],
        values: &[V],
    ) -> Result<Vec<Record>> {
        let predicate = Predicate::new(columns, values)?;
        self.with_table(name, |table| Ok(table.select_where(&predicate)))
    }

    /// Same predicate as `select_where`, routed through available indexes
    pub fn select_indexed<C: AsRef<str>, V: AsRef<str>>(
        &self,
        name: &str,
        columns: &[C],
        values: &[V],
    ) -> Result<Selection> {
        let predicate = Predicate::new(columns, values)?;

        let Some(mut table) = self.load_table(name)? else {
            return Ok(Selection {
                strategy: Strategy::Unindexed,
                records: Vec::new(),
            });
        };

        let mut indexes = HashMap::new();
        for column in predicate.columns() {
            if indexes.contains_key(column) {
                continue;
            }
            if let Some(index) = self.load_index(name, column)? {
                indexes.insert(column.to_string(), index);
            }
        }

        let selection = query::select_indexed(&mut table, &predicate, &indexes);
        self.save_table(&table)?;
        Ok(selection)
    }

    // =========================================================================
    // Bitmap Indexes
    // =========================================================================

    /// Build (or rebuild) the bitmap index of `column` with one full scan
    ///
    /// Missing table or column is a no-op.
    pub fn create_bitmap_index(&self, name: &str, column: &str) -> Result<()> {
        let Some(mut table) = self.load_table(name)? else {
            tracing::warn!(table = name, "index on missing table ignored");
            return Ok(());
        };

        let Some(index) = BitmapIndex::build(&table, column) else {
            tracing::warn!(table = name, column, "index on missing column ignored");
            return Ok(());
        };

        self.save_index(name, &index)?;
        table.add_indexed_column(column);
        table.push_trace(format!(
            "Created bitmap index for column: {} with {} records",
            column,
            index.total_records()
        ));
        self.save_table(&table)?;

        tracing::debug!(
            table = name,
            column,
            records = index.total_records(),
            distinct = index.distinct_count(),
            "bitmap index built"
        );
        Ok(())
    }

    /// Records with `column == value`, found through the column's index only
    ///
    /// Empty if the table or the index is absent.
    pub fn select_using_index(&self, name: &str, column: &str, value: &str) -> Result<Vec<Record>> {
        let Some(table) = self.load_table(name)? else {
            return Ok(Vec::new());
        };
        let Some(index) = self.load_index(name, column)? else {
            return Ok(Vec::new());
        };
        Ok(query::select_by_index(&table, &index, value))
    }

    /// `"0"`/`"1"` rendering of `value`'s bit vector; empty if unknown
    pub fn value_bits(&self, name: &str, column: &str, value: &str) -> Result<String> {
        let Some(index) = self.load_index(name, column)? else {
            return Ok(String::new());
        };
        let Some(bits) = index.bit_string(value) else {
            return Ok(String::new());
        };

        if let Some(mut table) = self.load_table(name)? {
            table.push_trace(format!(
                "Retrieved bitstream for value: {} in column: {}",
                value, column
            ));
            self.save_table(&table)?;
        }
        Ok(bits)
    }

    // =========================================================================
    // Validation & Recovery
    // =========================================================================

    /// Records whose page snapshot is missing from the store
    pub fn validate_records(&self, name: &str) -> Result<Vec<Record>> {
        let store = &self.store;
        self.with_table(name, |table| PageRecovery::validate(table, store))
    }

    /// Reinsert `missing` and rewrite the page snapshots they belong to
    pub fn recover_records(&self, name: &str, missing: &[Record]) -> Result<()> {
        if missing.is_empty() {
            return Ok(());
        }
        let Some(mut table) = self.load_table(name)? else {
            return Ok(());
        };

        let Some(result) = PageRecovery::recover(&mut table, missing)? else {
            return Ok(());
        };

        for page_number in &result.pages {
            self.save_page(&table, *page_number)?;
        }
        self.save_table(&table)?;

        tracing::info!(
            table = name,
            records = result.records_recovered,
            unmatched = result.records_unmatched,
            pages = ?result.pages,
            "recovered missing records"
        );
        Ok(())
    }

    /// Rewrite one page snapshot from the table's records
    pub fn recover_page(&self, name: &str, page_number: usize) -> Result<()> {
        let Some(table) = self.load_table(name)? else {
            return Ok(());
        };

        let page = PageRecovery::expected_page(&table, page_number);
        self.store
            .store(&StoreKey::page(name, page_number), encode(&page)?)?;
        tracing::info!(table = name, page = page_number, records = page.len(), "page rewritten");
        Ok(())
    }

    // =========================================================================
    // Trace
    // =========================================================================

    /// Every trace entry plus a layout summary; empty for a missing table
    pub fn full_trace(&self, name: &str) -> Result<String> {
        Ok(self
            .load_table(name)?
            .map(|table| table.full_trace())
            .unwrap_or_default())
    }

    /// Most recent trace entry; empty for a missing table
    pub fn last_trace(&self, name: &str) -> Result<String> {
        Ok(self
            .load_table(name)?
            .map(|table| table.last_trace())
            .unwrap_or_default())
    }

    /// Summary of persisted keys
    pub fn store_trace(&self) -> Result<String> {
        self.store.trace()
    }

    /// Clear all persisted state
    pub fn reset(&self) -> Result<()> {
        self.store.reset()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Load a table without touching its trace
    pub fn table(&self, name: &str) -> Result<Option<Table>> {
        self.load_table(name)
    }

    /// Load a persisted bitmap index
    pub fn index(&self, name: &str, column: &str) -> Result<Option<BitmapIndex>> {
        self.load_index(name, column)
    }

    /// Load a persisted page snapshot
    pub fn page_snapshot(&self, name: &str, page_number: usize) -> Result<Option<Page>> {
        self.store
            .load(&StoreKey::page(name, page_number))?
            .map(|blob| decode(&blob))
            .transpose()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Load → operate → store; missing tables yield `T::default()`
    fn with_table<T, F>(&self, name: &str, op: F) -> Result<T>
    where
        T: Default,
        F: FnOnce(&mut Table) -> Result<T>,
    {
        let Some(mut table) = self.load_table(name)? else {
            tracing::debug!(table = name, "table not found");
            return Ok(T::default());
        };
        let out = op(&mut table)?;
        self.save_table(&table)?;
        Ok(out)
    }

    fn load_table(&self, name: &str) -> Result<Option<Table>> {
        self.store
            .load(&StoreKey::table(name))?
            .map(|blob| decode(&blob))
            .transpose()
    }

    fn save_table(&self, table: &Table) -> Result<()> {
        self.store.store(&StoreKey::table(table.name()), encode(table)?)
    }

    fn save_page(&self, table: &Table, page_number: usize) -> Result<()> {
        if let Some(page) = table.page(page_number) {
            self.store
                .store(&StoreKey::page(table.name(), page_number), encode(page)?)?;
        }
        Ok(())
    }

    fn load_index(&self, name: &str, column: &str) -> Result<Option<BitmapIndex>> {
        self.store
            .load(&StoreKey::index(name, column))?
            .map(|blob| decode(&blob))
            .transpose()
    }

    fn save_index(&self, name: &str, index: &BitmapIndex) -> Result<()> {
        self.store
            .store(&StoreKey::index(name, index.column()), encode(index)?)
    }
}

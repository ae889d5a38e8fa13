//! Page Validation & Recovery
//!
//! Reconciles an in-memory table against its persisted page snapshots.
//!
//! ## Protocol
//! 1. `validate`: for every page number of the table, try to load the page
//!    snapshot. A page that is absent (or unreadable) contributes the records
//!    the table says belong there: positions `[p * cap, min((p + 1) * cap, N))`.
//! 2. `recover`: locate each missing record by its first field-wise match in
//!    the table, group by page, clear the trace, reinsert, and log one
//!    summary entry. The caller persists the table and rewrites the snapshot
//!    of every page that received records.
//!
//! The table being repaired is also the source of truth, so it must not be
//! corrupted itself. Tables holding duplicate rows map every copy to the page
//! of the first one.

use std::collections::BTreeMap;

use crate::error::{FileTableError, Result};
use crate::store::{decode, Store, StoreKey};
use crate::table::{Page, Record, Table};

/// Validates and repairs persisted page snapshots
pub struct PageRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of records handed in for recovery
    pub records_recovered: usize,

    /// Pages that received records, ascending
    pub pages: Vec<usize>,

    /// Records with no match in the table (not reinserted)
    pub records_unmatched: usize,
}

impl PageRecovery {
    /// Collect the records of every page whose snapshot is missing
    ///
    /// Appends "Validating records: {n} records missing." to the trace.
    pub fn validate<S: Store + ?Sized>(table: &mut Table, store: &S) -> Result<Vec<Record>> {
        let all: Vec<Record> = table.records().cloned().collect();
        let mut missing = Vec::new();

        for page_number in 0..table.page_count() {
            if Self::snapshot_readable(table.name(), page_number, store)? {
                continue;
            }

            let range = table.page_range(page_number);
            tracing::info!(
                table = table.name(),
                page = page_number,
                records = range.len(),
                "page snapshot missing"
            );
            missing.extend_from_slice(&all[range]);
        }

        table.push_trace(format!(
            "Validating records: {} records missing.",
            missing.len()
        ));
        Ok(missing)
    }

    /// Reinsert `missing` into the pages they belong to
    ///
    /// Returns `None` (and leaves the trace untouched) when there is nothing
    /// to recover. Otherwise the trace is replaced by a single entry
    /// "Recovering missing records: {n} records in pages: [..]".
    pub fn recover(table: &mut Table, missing: &[Record]) -> Result<Option<RecoveryResult>> {
        if missing.is_empty() {
            return Ok(None);
        }

        let mut groups: BTreeMap<usize, Vec<Record>> = BTreeMap::new();
        let mut records_unmatched = 0;
        for record in missing {
            match table.position_of(record) {
                Some(position) => {
                    let (page_number, _) = table.coordinate_of(position);
                    groups.entry(page_number).or_default().push(record.clone());
                }
                None => {
                    tracing::warn!(table = table.name(), ?record, "missing record not found in table");
                    records_unmatched += 1;
                }
            }
        }

        table.clear_trace();
        for (page_number, records) in &groups {
            for record in records {
                table.recover_record(record.clone(), *page_number)?;
            }
        }

        let pages: Vec<usize> = groups.keys().copied().collect();
        table.push_trace(format!(
            "Recovering missing records: {} records in pages: {:?}",
            missing.len(),
            pages
        ));

        Ok(Some(RecoveryResult {
            records_recovered: missing.len(),
            pages,
            records_unmatched,
        }))
    }

    /// The page the table says should sit at `page_number`
    pub fn expected_page(table: &Table, page_number: usize) -> Page {
        let range = table.page_range(page_number);
        let mut page = Page::new();
        for record in table.records().skip(range.start).take(range.len()) {
            page.insert(record.clone());
        }
        page
    }

    /// Whether the page snapshot exists and decodes
    fn snapshot_readable<S: Store + ?Sized>(table: &str, page_number: usize, store: &S) -> Result<bool> {
        let key = StoreKey::page(table, page_number);
        let blob = match store.load(&key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Ok(false),
            Err(FileTableError::Corruption(reason)) => {
                tracing::warn!(%key, %reason, "treating corrupted page snapshot as missing");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        match decode::<Page>(&blob) {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(%key, error = %e, "treating undecodable page snapshot as missing");
                Ok(false)
            }
        }
    }
}

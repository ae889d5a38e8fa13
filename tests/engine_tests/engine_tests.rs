//! Tests for the Engine
//!
//! These tests verify:
//! - The five-student walkthrough on a page capacity of 2
//! - Bitmap index creation, lookups and bit strings
//! - Strategy selection through persisted indexes
//! - Validate → recover round trip after losing a page snapshot
//! - Absent tables, columns and indexes
//! - File-backed persistence across reopen

use filetable::config::{Config, SyncStrategy};
use filetable::query::Strategy;
use filetable::store::{MemoryStore, Store, StoreKey};
use filetable::table::{record, Record};
use filetable::{Engine, FileTableError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const COLUMNS: [&str; 5] = ["id", "name", "major", "semester", "gpa"];

fn students() -> Vec<Record> {
    vec![
        record(&["1", "stud1", "CS", "5", "0.9"]),
        record(&["2", "stud2", "BI", "7", "1.2"]),
        record(&["3", "stud3", "CS", "2", "2.4"]),
        record(&["4", "stud4", "DMET", "9", "1.2"]),
        record(&["5", "stud5", "BI", "4", "3.5"]),
    ]
}

fn test_config() -> Config {
    Config::builder().page_capacity(2).build()
}

fn setup_engine() -> Engine<MemoryStore> {
    let engine = Engine::in_memory(test_config()).unwrap();
    engine.create_table("student", &COLUMNS).unwrap();
    for r in students() {
        engine.insert("student", r.as_slice()).unwrap();
    }
    engine
}

fn setup_file_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .page_capacity(2)
        .sync_strategy(SyncStrategy::EveryWrite)
        .build();
    let engine = Engine::open(config).unwrap();
    (temp_dir, engine)
}

// =============================================================================
// Basic Operation Tests
// =============================================================================

#[test]
fn test_worked_example() {
    let engine = setup_engine();
    let all = students();

    let table = engine.table("student").unwrap().unwrap();
    assert_eq!(table.page_count(), 3);
    assert_eq!(table.page(0).unwrap().records(), &all[0..2]);
    assert_eq!(table.page(1).unwrap().records(), &all[2..4]);
    assert_eq!(table.page(2).unwrap().records(), &all[4..5]);

    assert_eq!(engine.select_all("student").unwrap(), all);
    assert_eq!(engine.select_at("student", 1, 1).unwrap(), vec![all[3].clone()]);
    assert_eq!(
        engine.select_where("student", &["gpa"], &["1.2"]).unwrap(),
        vec![all[1].clone(), all[3].clone()]
    );
}

#[test]
fn test_insert_writes_page_snapshots() {
    let engine = setup_engine();
    let all = students();

    for page_number in 0..3 {
        let snapshot = engine.page_snapshot("student", page_number).unwrap().unwrap();
        assert_eq!(snapshot.records(), &all[page_number * 2..(page_number * 2 + 2).min(5)]);
    }
    assert!(engine.page_snapshot("student", 3).unwrap().is_none());
}

#[test]
fn test_insert_arity_mismatch() {
    let engine = setup_engine();

    let err = engine.insert("student", &["6", "stud6"]).unwrap_err();

    assert!(matches!(
        err,
        FileTableError::ArityMismatch { expected: 5, actual: 2 }
    ));
    assert_eq!(engine.select_all("student").unwrap().len(), 5);
}

#[test]
fn test_predicate_errors() {
    let engine = setup_engine();
    let empty: [&str; 0] = [];

    assert!(matches!(
        engine.select_where("student", &["gpa", "major"], &["1.2"]),
        Err(FileTableError::PredicateLengthMismatch { .. })
    ));
    assert!(matches!(
        engine.select_where("student", &empty, &empty),
        Err(FileTableError::EmptyPredicate)
    ));
    assert!(matches!(
        engine.select_indexed("student", &empty, &empty),
        Err(FileTableError::EmptyPredicate)
    ));
}

#[test]
fn test_select_at_out_of_range() {
    let engine = setup_engine();

    assert!(engine.select_at("student", 2, 1).unwrap().is_empty());
    assert!(engine.select_at("student", 10, 0).unwrap().is_empty());
}

#[test]
fn test_trace_records_operations() {
    let engine = setup_engine();

    engine.select_all("student").unwrap();
    assert_eq!(engine.last_trace("student").unwrap(), "Select all pages:3, records:5");

    engine.select_where("student", &["gpa"], &["1.2"]).unwrap();
    assert_eq!(
        engine.last_trace("student").unwrap(),
        "Select condition:[gpa]->[1.2], Records per page:[[0, 1], [1, 1]], records:2"
    );

    let full = engine.full_trace("student").unwrap();
    assert!(full.starts_with("Table created name:student"));
    assert!(full.ends_with("Pages Count: 3, Records Count: 5, Indexed Columns: []"));
}

// =============================================================================
// Missing Table Tests
// =============================================================================

#[test]
fn test_missing_table_is_empty() {
    let engine = Engine::in_memory(test_config()).unwrap();

    engine.insert("ghost", &["1"]).unwrap();
    engine.create_bitmap_index("ghost", "a").unwrap();
    engine.recover_records("ghost", &[record(&["1"])]).unwrap();
    engine.recover_page("ghost", 0).unwrap();

    assert!(engine.select_all("ghost").unwrap().is_empty());
    assert!(engine.select_at("ghost", 0, 0).unwrap().is_empty());
    assert!(engine.select_where("ghost", &["a"], &["1"]).unwrap().is_empty());
    assert!(engine.select_using_index("ghost", "a", "1").unwrap().is_empty());
    assert!(engine.validate_records("ghost").unwrap().is_empty());
    assert_eq!(engine.value_bits("ghost", "a", "1").unwrap(), "");
    assert_eq!(engine.full_trace("ghost").unwrap(), "");
    assert_eq!(engine.last_trace("ghost").unwrap(), "");

    let selection = engine.select_indexed("ghost", &["a"], &["1"]).unwrap();
    assert_eq!(selection.strategy, Strategy::Unindexed);
    assert!(selection.records.is_empty());

    assert!(engine.store().is_empty());
}

#[test]
fn test_create_table_replaces_existing() {
    let engine = setup_engine();
    engine.create_bitmap_index("student", "gpa").unwrap();

    engine.create_table("student", &["x", "y"]).unwrap();

    let table = engine.table("student").unwrap().unwrap();
    assert_eq!(table.columns(), &["x".to_string(), "y".to_string()]);
    assert_eq!(table.record_count(), 0);
    assert!(engine.index("student", "gpa").unwrap().is_none());
    assert!(engine.page_snapshot("student", 0).unwrap().is_none());
    assert_eq!(table.trace().len(), 1);
}

#[test]
fn test_drop_table() {
    let engine = setup_engine();
    engine.create_table("other", &["a"]).unwrap();

    assert!(engine.drop_table("student").unwrap());
    assert!(!engine.drop_table("student").unwrap());

    assert!(engine.table("student").unwrap().is_none());
    assert_eq!(
        engine.store().keys().unwrap(),
        vec![StoreKey::table("other")]
    );
}

// =============================================================================
// Bitmap Index Tests
// =============================================================================

#[test]
fn test_create_bitmap_index() {
    let engine = setup_engine();

    engine.create_bitmap_index("student", "gpa").unwrap();

    let index = engine.index("student", "gpa").unwrap().unwrap();
    assert_eq!(index.total_records(), 5);
    assert_eq!(
        engine.last_trace("student").unwrap(),
        "Created bitmap index for column: gpa with 5 records"
    );
    assert_eq!(
        engine.table("student").unwrap().unwrap().indexed_columns(),
        &["gpa".to_string()]
    );
}

#[test]
fn test_create_bitmap_index_unknown_column() {
    let engine = setup_engine();

    engine.create_bitmap_index("student", "nope").unwrap();

    assert!(engine.index("student", "nope").unwrap().is_none());
    assert!(engine.table("student").unwrap().unwrap().indexed_columns().is_empty());
}

#[test]
fn test_value_bits() {
    let engine = setup_engine();
    engine.create_bitmap_index("student", "gpa").unwrap();
    engine.create_bitmap_index("student", "major").unwrap();

    assert_eq!(engine.value_bits("student", "gpa", "1.2").unwrap(), "01010");
    assert_eq!(
        engine.last_trace("student").unwrap(),
        "Retrieved bitstream for value: 1.2 in column: gpa"
    );
    assert_eq!(engine.value_bits("student", "major", "CS").unwrap(), "10100");
    assert_eq!(engine.value_bits("student", "major", "EE").unwrap(), "");
    assert_eq!(engine.value_bits("student", "name", "stud1").unwrap(), "");
}

#[test]
fn test_select_using_index() {
    let engine = setup_engine();
    let all = students();
    engine.create_bitmap_index("student", "major").unwrap();

    assert_eq!(
        engine.select_using_index("student", "major", "BI").unwrap(),
        vec![all[1].clone(), all[4].clone()]
    );
    assert!(engine.select_using_index("student", "major", "EE").unwrap().is_empty());
    assert!(engine.select_using_index("student", "gpa", "1.2").unwrap().is_empty());
}

#[test]
fn test_select_indexed_strategies() {
    let engine = setup_engine();
    let all = students();

    let selection = engine.select_indexed("student", &["gpa"], &["1.2"]).unwrap();
    assert_eq!(selection.strategy, Strategy::Unindexed);
    assert_eq!(selection.records, vec![all[1].clone(), all[3].clone()]);

    engine.create_bitmap_index("student", "gpa").unwrap();
    let selection = engine.select_indexed("student", &["gpa"], &["1.2"]).unwrap();
    assert_eq!(selection.strategy, Strategy::AllIndexed);
    assert_eq!(selection.records, vec![all[1].clone(), all[3].clone()]);

    let selection = engine
        .select_indexed("student", &["gpa", "major"], &["1.2", "DMET"])
        .unwrap();
    assert_eq!(selection.strategy, Strategy::SingleIndexed);
    assert_eq!(selection.records, vec![all[3].clone()]);

    engine.create_bitmap_index("student", "major").unwrap();
    let selection = engine
        .select_indexed("student", &["gpa", "major", "semester"], &["1.2", "BI", "7"])
        .unwrap();
    assert_eq!(selection.strategy, Strategy::PartialIndexed);
    assert_eq!(selection.records, vec![all[1].clone()]);
    assert_eq!(
        engine.last_trace("student").unwrap(),
        "Index selection: partial-indexed, found 1 records"
    );
}

#[test]
fn test_index_goes_stale_after_insert() {
    let engine = setup_engine();
    engine.create_bitmap_index("student", "gpa").unwrap();
    engine.insert("student", &["6", "stud6", "CS", "1", "1.2"]).unwrap();

    assert_eq!(engine.select_using_index("student", "gpa", "1.2").unwrap().len(), 2);
    assert_eq!(engine.select_where("student", &["gpa"], &["1.2"]).unwrap().len(), 3);

    engine.create_bitmap_index("student", "gpa").unwrap();
    assert_eq!(engine.select_using_index("student", "gpa", "1.2").unwrap().len(), 3);
}

// =============================================================================
// Validation & Recovery Tests
// =============================================================================

#[test]
fn test_validate_reports_nothing_when_intact() {
    let engine = setup_engine();

    assert!(engine.validate_records("student").unwrap().is_empty());
    assert_eq!(
        engine.last_trace("student").unwrap(),
        "Validating records: 0 records missing."
    );
}

#[test]
fn test_validate_and_recover_round_trip() {
    let engine = setup_engine();
    let all = students();
    engine.store().remove(&StoreKey::page("student", 1)).unwrap();

    let missing = engine.validate_records("student").unwrap();
    assert_eq!(missing, all[2..4].to_vec());
    assert_eq!(
        engine.last_trace("student").unwrap(),
        "Validating records: 2 records missing."
    );

    engine.recover_records("student", &missing).unwrap();

    let table = engine.table("student").unwrap().unwrap();
    assert_eq!(table.trace().len(), 1);
    assert_eq!(
        table.last_trace(),
        "Recovering missing records: 2 records in pages: [1]"
    );
    assert_eq!(
        engine.page_snapshot("student", 1).unwrap().unwrap().records(),
        &all[2..4]
    );
    assert_eq!(engine.select_all("student").unwrap(), all);
    assert!(engine.validate_records("student").unwrap().is_empty());
}

#[test]
fn test_recover_nothing_leaves_trace() {
    let engine = setup_engine();
    let before = engine.full_trace("student").unwrap();

    engine.recover_records("student", &[]).unwrap();

    assert_eq!(engine.full_trace("student").unwrap(), before);
}

#[test]
fn test_recover_rewrites_only_resolved_pages() {
    let engine = Engine::in_memory(test_config()).unwrap();
    engine.create_table("dups", &["v"]).unwrap();
    for v in ["A", "B", "A", "B"] {
        engine.insert("dups", &[v]).unwrap();
    }
    engine.store().remove(&StoreKey::page("dups", 1)).unwrap();

    let missing = engine.validate_records("dups").unwrap();
    engine.recover_records("dups", &missing).unwrap();

    // both copies resolve to page 0, so page 1 is never rewritten
    assert_eq!(
        engine.last_trace("dups").unwrap(),
        "Recovering missing records: 2 records in pages: [0]"
    );
    assert!(engine.page_snapshot("dups", 1).unwrap().is_none());
    assert_eq!(engine.validate_records("dups").unwrap().len(), 2);

    engine.recover_page("dups", 1).unwrap();
    assert!(engine.validate_records("dups").unwrap().is_empty());
}

#[test]
fn test_recover_page() {
    let engine = setup_engine();
    let all = students();
    engine.store().remove(&StoreKey::page("student", 2)).unwrap();

    engine.recover_page("student", 2).unwrap();

    assert_eq!(
        engine.page_snapshot("student", 2).unwrap().unwrap().records(),
        &all[4..5]
    );
    assert!(engine.validate_records("student").unwrap().is_empty());
}

// =============================================================================
// Store Trace & Reset Tests
// =============================================================================

#[test]
fn test_store_trace() {
    let engine = setup_engine();
    engine.create_bitmap_index("student", "gpa").unwrap();

    assert_eq!(
        engine.store_trace().unwrap(),
        "student: table present, pages [0, 1, 2], indexes [gpa]"
    );
}

#[test]
fn test_reset() {
    let engine = setup_engine();

    engine.reset().unwrap();

    assert_eq!(engine.store_trace().unwrap(), "Store is empty");
    assert!(engine.select_all("student").unwrap().is_empty());
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_zero_page_capacity_rejected() {
    let config = Config::builder().page_capacity(0).build();

    assert!(matches!(
        Engine::in_memory(config),
        Err(FileTableError::Config(_))
    ));
}

#[test]
fn test_default_page_capacity() {
    let engine = Engine::in_memory(Config::default()).unwrap();
    engine.create_table("t", &["a"]).unwrap();
    for i in 0..201 {
        engine.insert("t", &[i.to_string()]).unwrap();
    }

    let table = engine.table("t").unwrap().unwrap();
    assert_eq!(engine.config().page_capacity, 200);
    assert_eq!(table.page_count(), 2);
    assert_eq!(table.page(1).unwrap().len(), 1);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_file_engine_persists_across_reopen() {
    let (temp_dir, engine) = setup_file_engine();
    engine.create_table("student", &COLUMNS).unwrap();
    for r in students() {
        engine.insert("student", r.as_slice()).unwrap();
    }
    engine.create_bitmap_index("student", "major").unwrap();
    drop(engine);

    let engine = Engine::open_path(temp_dir.path()).unwrap();

    assert_eq!(engine.select_all("student").unwrap(), students());
    assert_eq!(engine.value_bits("student", "major", "BI").unwrap(), "01001");
    assert_eq!(engine.table("student").unwrap().unwrap().page_capacity(), 2);
    assert!(engine.validate_records("student").unwrap().is_empty());
}

#[test]
fn test_file_engine_recovers_deleted_page_file() {
    let (temp_dir, engine) = setup_file_engine();
    engine.create_table("student", &COLUMNS).unwrap();
    for r in students() {
        engine.insert("student", r.as_slice()).unwrap();
    }

    std::fs::remove_file(temp_dir.path().join("student").join("page_000000.ftb")).unwrap();

    let missing = engine.validate_records("student").unwrap();
    assert_eq!(missing, students()[0..2].to_vec());

    engine.recover_records("student", &missing).unwrap();
    assert!(temp_dir.path().join("student").join("page_000000.ftb").is_file());
    assert!(engine.validate_records("student").unwrap().is_empty());
}

#[test]
fn test_file_engine_indexes_non_identifier_columns() {
    let (_temp_dir, engine) = setup_file_engine();
    engine.create_table("club members", &["first name", "id"]).unwrap();
    for fields in [["bob", "1"], ["amy", "2"], ["bob", "3"]] {
        engine.insert("club members", &fields).unwrap();
    }
    let bobs = vec![record(&["bob", "1"]), record(&["bob", "3"])];

    assert_eq!(
        engine.select_where("club members", &["first name"], &["bob"]).unwrap(),
        bobs
    );

    engine.create_bitmap_index("club members", "first name").unwrap();
    assert!(engine.index("club members", "first name").unwrap().is_some());

    let selection = engine
        .select_indexed("club members", &["first name"], &["bob"])
        .unwrap();
    assert_eq!(selection.strategy, Strategy::AllIndexed);
    assert_eq!(selection.records, bobs);

    assert_eq!(
        engine.select_using_index("club members", "first name", "bob").unwrap(),
        bobs
    );
    assert_eq!(engine.value_bits("club members", "first name", "amy").unwrap(), "010");
    assert_eq!(
        engine.store_trace().unwrap(),
        "club members: table present, pages [0, 1], indexes [first name]"
    );
}

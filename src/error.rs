//! Error types for FileTable
//!
//! Provides a unified error type for all operations.
//!
//! Absent tables, columns, indexes and pages are not errors: operations
//! resolve them to empty results. Only malformed input and storage failures
//! surface here.

use thiserror::Error;

/// Result type alias using FileTableError
pub type Result<T> = std::result::Result<T, FileTableError>;

/// Unified error type for FileTable operations
#[derive(Debug, Error)]
pub enum FileTableError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("Arity mismatch: table has {expected} columns, record has {actual} fields")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("Predicate length mismatch: {columns} columns, {values} values")]
    PredicateLengthMismatch { columns: usize, values: usize },

    #[error("Predicate must contain at least one column/value pair")]
    EmptyPredicate,

    #[error("Invalid name for persistence: {0:?}")]
    InvalidName(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupted blob: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for FileTableError {
    fn from(err: bincode::Error) -> Self {
        FileTableError::Serialization(err.to_string())
    }
}

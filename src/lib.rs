//! # FileTable
//!
//! A minimal paged table store with:
//! - Text records split into fixed-capacity pages
//! - Full scans, (page, offset) lookups and equality predicates
//! - Per-column bitmap indexes and an index-aware selection chooser
//! - Validation and recovery of persisted page snapshots
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Engine                              │
//! │              (load → operate → store per call)               │
//! └──────┬───────────────┬────────────────┬────────────────┬────┘
//!        │               │                │                │
//!        ▼               ▼                ▼                ▼
//!  ┌───────────┐  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐
//!  │   Table   │  │   Bitmap    │  │  Selection  │  │    Page     │
//!  │  (Pages)  │  │   Index     │  │   Chooser   │  │  Recovery   │
//!  └─────┬─────┘  └─────────────┘  └─────────────┘  └─────────────┘
//!        │
//!        ▼
//!  ┌─────────────────────────────────────────────────────────────┐
//!  │                    Store (key → blob)                        │
//!  │            MemoryStore │ FileStore (framed files)            │
//!  └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod table;
pub mod index;
pub mod query;
pub mod recovery;
pub mod store;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FileTableError, Result};
pub use config::{Config, SyncStrategy};
pub use engine::Engine;
pub use table::{Record, Table};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of FileTable
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

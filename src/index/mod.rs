//! Index Module
//!
//! Per-column bitmap indexes.
//!
//! ## Layout
//! ```text
//! column "major", 5 records: CS BI CS DMET BI
//!
//!   value_ids        bitmaps (position 0 → 4)
//!   ┌──────┬───┐     ┌───────────┐
//!   │ BI   │ 1 │ ──► │ 0 1 0 0 1 │
//!   │ CS   │ 0 │ ──► │ 1 0 1 0 0 │
//!   │ DMET │ 2 │ ──► │ 0 0 0 1 0 │
//!   └──────┴───┘     └───────────┘
//! ```
//!
//! An index is built by one full scan and is not maintained on later inserts;
//! rebuild it after the table changes.

mod bitmap;
mod bitvec;

pub use bitmap::BitmapIndex;
pub use bitvec::BitVector;

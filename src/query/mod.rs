//! Query Module
//!
//! Equality predicates and the index-aware selection chooser.
//!
//! ## Strategies
//! | indexed (k) of conditions (m) | strategy          | method                          |
//! |-------------------------------|-------------------|---------------------------------|
//! | k == m                        | `all-indexed`     | intersect all position sets     |
//! | k == 1, m > 1                 | `single-indexed`  | one index, filter the rest      |
//! | 1 < k < m                     | `partial-indexed` | intersect k sets, filter m - k  |
//! | k == 0                        | `unindexed`       | linear scan                     |

mod chooser;
mod predicate;

pub use chooser::{select_by_index, select_indexed, Selection, Strategy};
pub use predicate::{Condition, Predicate};

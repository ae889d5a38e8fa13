//! Store keys

use std::fmt;

/// Address of a persisted object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKey {
    /// Table metadata, pages and trace
    Table(String),

    /// Bitmap index of one column
    Index { table: String, column: String },

    /// Snapshot of one page
    Page { table: String, page: usize },
}

impl StoreKey {
    pub fn table(name: impl Into<String>) -> Self {
        StoreKey::Table(name.into())
    }

    pub fn index(table: impl Into<String>, column: impl Into<String>) -> Self {
        StoreKey::Index {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn page(table: impl Into<String>, page: usize) -> Self {
        StoreKey::Page {
            table: table.into(),
            page,
        }
    }

    /// The table this key belongs to
    pub fn table_name(&self) -> &str {
        match self {
            StoreKey::Table(name) => name,
            StoreKey::Index { table, .. } => table,
            StoreKey::Page { table, .. } => table,
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKey::Table(name) => write!(f, "table:{}", name),
            StoreKey::Index { table, column } => write!(f, "index:{}/{}", table, column),
            StoreKey::Page { table, page } => write!(f, "page:{}/{}", table, page),
        }
    }
}

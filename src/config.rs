//! Configuration for FileTable
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{FileTableError, Result};

/// Main configuration for a FileTable instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the file store
    /// Internal structure:
    ///   {data_dir}/
    ///     └── {table}/
    ///           ├── table.ftb           (table metadata + pages)
    ///           ├── index_{column}.ftb  (bitmap indexes)
    ///           └── page_{n}.ftb        (page snapshots)
    pub data_dir: PathBuf,

    /// Sync strategy: whether every stored blob is fsynced
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Table Configuration
    // -------------------------------------------------------------------------
    /// Maximum number of records per page, fixed for a table at creation
    pub page_capacity: usize,
}

/// File store sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every stored blob
    EveryWrite,

    /// Leave flushing to the OS
    OnDemand,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./filetable_data"),
            sync_strategy: SyncStrategy::OnDemand,
            page_capacity: 200,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the engine cannot operate with
    pub fn validate(&self) -> Result<()> {
        if self.page_capacity == 0 {
            return Err(FileTableError::Config(
                "page_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for the file store)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the page capacity (records per page)
    pub fn page_capacity(mut self, capacity: usize) -> Self {
        self.config.page_capacity = capacity;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

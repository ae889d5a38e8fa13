//! In-memory store
//!
//! Ordered map behind a RwLock. Nothing survives the process.

use std::collections::BTreeMap;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::Result;

use super::{Store, StoreKey};

/// Volatile [`Store`] for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<BTreeMap<StoreKey, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

impl Store for MemoryStore {
    fn store(&self, key: &StoreKey, blob: Bytes) -> Result<()> {
        self.blobs.write().insert(key.clone(), blob);
        Ok(())
    }

    fn load(&self, key: &StoreKey) -> Result<Option<Bytes>> {
        // Bytes clones share the buffer
        Ok(self.blobs.read().get(key).cloned())
    }

    fn remove(&self, key: &StoreKey) -> Result<bool> {
        Ok(self.blobs.write().remove(key).is_some())
    }

    fn reset(&self) -> Result<()> {
        self.blobs.write().clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<StoreKey>> {
        Ok(self.blobs.read().keys().cloned().collect())
    }
}

//! In-memory blob store.
//!
//! Used by tests to verify persistence behavior deterministically -- every
//! written key is recorded in order -- and usable by embedders that want a
//! process-lifetime store without touching disk.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::BlobStore;
use crate::error::StorageError;

#[derive(Debug, Default)]
struct Inner {
    values: BTreeMap<String, String>,
    write_log: Vec<String>,
    fail_writes: bool,
}

/// Thread-safe in-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys written so far, in write order (including overwrites).
    pub fn write_log(&self) -> Vec<String> {
        self.lock().write_log.clone()
    }

    /// Make every subsequent `set` fail, to exercise the best-effort save
    /// policy.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn len(&self) -> usize {
        self.lock().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // The map holds no cross-key invariants, so a write interrupted by a
    // panic leaves nothing to repair.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(StorageError::QueryFailed("writes disabled".to_string()));
        }
        inner.values.insert(key.to_string(), value.to_string());
        inner.write_log.push(key.to_string());
        Ok(())
    }
}

//! MemoryStore: an in-process StateStore.
//!
//! Suitable for single-node deployments and tests. State is lost on restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::error::StoreError;

use super::traits::{MicroState, StateStore};

/// In-memory salt → record map.
///
/// Interior mutability via `parking_lot::RwLock`, so one store can be shared
/// by every request thread.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<u64, MicroState>>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl StateStore for MemoryStore {
    fn put(&self, state: &MicroState) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.records.write().insert(state.salt, state.clone());
        Ok(())
    }

    fn get(&self, salt: u64) -> Result<Option<MicroState>, StoreError> {
        self.ensure_open()?;
        Ok(self.records.read().get(&salt).cloned())
    }

    fn list(&self, uid: &[u8]) -> Result<Vec<MicroState>, StoreError> {
        self.ensure_open()?;
        let mut states: Vec<MicroState> = self
            .records
            .read()
            .values()
            .filter(|s| s.uid.as_deref() == Some(uid))
            .cloned()
            .collect();
        states.sort_by_key(|s| s.salt);
        Ok(states)
    }

    fn remove(&self, salt: u64) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.records.write().remove(&salt);
        Ok(())
    }

    fn remove_all(&self, uid: &[u8]) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.records
            .write()
            .retain(|_, s| s.uid.as_deref() != Some(uid));
        Ok(())
    }

    fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        self.records.write().clear();
        Ok(())
    }
}

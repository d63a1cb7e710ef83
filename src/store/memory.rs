//! In-memory secret store.
//!
//! Backs tests and ephemeral sessions. Contents die with the process;
//! the record zeroizes on drop like any other.

use std::sync::RwLock;

use crate::error::StoreError;
use crate::store::{SecretRecord, SecretStore};

#[derive(Default)]
pub struct MemoryStore {
    slot: RwLock<Option<SecretRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemoryStore {
    fn store(&self, record: &SecretRecord) -> Result<(), StoreError> {
        let mut slot = self.slot.write().unwrap();
        *slot = Some(record.clone());
        Ok(())
    }

    fn load(&self) -> Result<SecretRecord, StoreError> {
        let slot = self.slot.read().unwrap();
        slot.clone().ok_or(StoreError::NotFound)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut slot = self.slot.write().unwrap();
        *slot = None;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

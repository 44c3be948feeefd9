//! In-process storage backend.

use super::{BoardStorage, StorageResult};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Map-backed storage for tests and ephemeral boards.
///
/// Single-threaded by construction; boards have no concurrent writer.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl BoardStorage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

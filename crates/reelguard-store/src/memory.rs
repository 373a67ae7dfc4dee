//! In-memory storage, for tests and ephemeral runs

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{KeyValueStorage, StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,

    /// Configure `set` to fail
    pub fail_writes: Arc<Mutex<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if *self.fail_writes.lock().map_err(|_| StoreError::Poisoned)? {
            return Err(StoreError::Database("Memory write failure".into()));
        }
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.remove(key);
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        self.values.lock().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.get("k").unwrap().is_none());

        storage.set("k", "v1").unwrap();
        storage.set("k", "v2").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(storage.len(), 1);

        storage.remove("k").unwrap();
        storage.remove("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn failing_writes_leave_values_untouched() {
        let storage = MemoryStorage::new();
        storage.set("k", "v1").unwrap();

        *storage.fail_writes.lock().unwrap() = true;
        assert!(storage.set("k", "v2").is_err());
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v1"));

        // Removal is unaffected
        storage.remove("k").unwrap();
        assert!(storage.is_empty());
    }
}

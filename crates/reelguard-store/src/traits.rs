//! Store trait definitions

use crate::StoreResult;

/// Synchronous string key-value storage.
///
/// Writes are single operations; a `set` either fully replaces the value or
/// fails. There is no cross-process coordination: last writer wins.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Overwrite the value stored under `key`
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Check if storage is healthy
    fn is_healthy(&self) -> bool;
}

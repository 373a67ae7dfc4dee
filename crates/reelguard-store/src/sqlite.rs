//! SQLite-based storage implementation

use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::{KeyValueStorage, StoreError, StoreResult};

/// SQLite-based key-value storage
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;

        let value: Option<String> = conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| row.get(0))
            .optional()?;

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;

        conn.execute(
            r#"
            INSERT INTO kv (key, value)
            VALUES (?, ?)
            ON CONFLICT(key)
            DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;

        debug!(key, "Value stored");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute("DELETE FROM kv WHERE key = ?", [key])?;
        debug!(key, "Value removed");
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStorage::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_upsert_and_remove() {
        let store = SqliteStorage::in_memory().unwrap();
        assert!(store.get("reelsTimeTracker").unwrap().is_none());

        store.set("reelsTimeTracker", "{\"a\":1}").unwrap();
        store.set("reelsTimeTracker", "{\"a\":2}").unwrap();
        assert_eq!(
            store.get("reelsTimeTracker").unwrap().as_deref(),
            Some("{\"a\":2}")
        );

        store.remove("reelsTimeTracker").unwrap();
        assert!(store.get("reelsTimeTracker").unwrap().is_none());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.db");

        {
            let store = SqliteStorage::open(&path).unwrap();
            store.set("key", "value").unwrap();
        }

        let store = SqliteStorage::open(&path).unwrap();
        assert_eq!(store.get("key").unwrap().as_deref(), Some("value"));
    }
}

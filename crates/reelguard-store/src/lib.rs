//! Persistence layer for reelguard
//!
//! Provides:
//! - A synchronous key-value storage seam (in-memory and SQLite backed)
//! - The persisted tracking session record and its store

mod memory;
mod session;
mod sqlite;
mod traits;

pub use memory::*;
pub use session::*;
pub use sqlite::*;
pub use traits::*;

use reelguard_util::ReelguardError;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<StoreError> for ReelguardError {
    fn from(e: StoreError) -> Self {
        ReelguardError::store(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

//! Error types for reelguard

use thiserror::Error;

/// Core error type for reelguard operations
#[derive(Debug, Error)]
pub enum ReelguardError {
    #[error("Tracker already torn down")]
    TornDown,

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Host error: {0}")]
    HostError(String),
}

impl ReelguardError {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn host(msg: impl Into<String>) -> Self {
        Self::HostError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ReelguardError>;

//! Shared utilities for reelguard
//!
//! This crate provides:
//! - ID types (TimerId, ObserverId)
//! - Time utilities (epoch milliseconds, injectable clocks, mock time)
//! - Error types
//! - Default paths for config and data directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;

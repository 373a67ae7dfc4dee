//! Terminal host for reelguard
//!
//! Provides:
//! - A simulated page whose location changes when the user types `goto`
//! - Overlays drawn as text blocks on stdout
//! - Recurring timers backed by tokio tasks

mod page;
mod scheduler;

pub use page::*;
pub use scheduler::*;

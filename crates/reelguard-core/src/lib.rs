//! Time-tracking and enforcement engine for reelguard
//!
//! This crate is the heart of reelguard, containing:
//! - Location classification (is the user in the monitored section?)
//! - Remaining-budget calculation from the persisted session
//! - The enforcement poller (Stopped -> Running -> Stopped)
//! - The overlay presenter and its acknowledgement handling
//! - The navigation watcher (Idle <-> Tracking)
//! - The tracker factory tying them together, and a bootstrap that waits
//!   for the user to enter the section

mod bootstrap;
mod events;
mod location;
mod poller;
mod presenter;
mod remaining;
mod tracker;
mod watcher;

pub use bootstrap::*;
pub use events::*;
pub use location::*;
pub use poller::*;
pub use presenter::*;
pub use remaining::*;
pub use tracker::*;
pub use watcher::*;

/// Result type for tracker operations
pub type CoreResult<T> = reelguard_util::Result<T>;

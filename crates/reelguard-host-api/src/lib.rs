//! Host collaborator interfaces for reelguard
//!
//! This crate defines the seam between the tracker core and the page it runs
//! in: where the user is, how the overlay is drawn, how navigation happens,
//! and how timers and document observers are registered. It contains no
//! platform code itself.

mod bindings;
mod mock;
mod overlay;
mod traits;

pub use bindings::*;
pub use mock::*;
pub use overlay::*;
pub use traits::*;

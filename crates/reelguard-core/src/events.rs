//! Core events emitted by the tracker

use reelguard_store::TrackingSession;
use serde::Serialize;

/// What the tracker did in response to a host event or a direct call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoreEvent {
    /// Entered the monitored section and the poller started
    TrackingStarted {
        session: TrackingSession,
        /// True if a new budget period began, false if an existing one resumed
        fresh: bool,
    },

    /// Left the monitored section; the poller stopped, the session remains
    TrackingStopped,

    /// A warning overlay was shown
    WarningShown { remaining_minutes: f64 },

    /// Budget ran out; the finished overlay is up and the poller stopped
    BudgetExhausted,

    /// The user dismissed the overlay
    OverlayAcknowledged {
        finished: bool,
        redirected_to: Option<String>,
    },

    /// The session was cleared and started over
    SessionReset { session: TrackingSession },
}

//! Host collaborator traits

use reelguard_util::{ObserverId, ReelguardError, TimerId};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::OverlayView;

/// Errors from host operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Scheduling failed: {0}")]
    ScheduleFailed(String),

    #[error("Observer registration failed: {0}")]
    ObserveFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<HostError> for ReelguardError {
    fn from(e: HostError) -> Self {
        ReelguardError::host(e.to_string())
    }
}

pub type HostResult<T> = Result<T, HostError>;

/// Asynchronous notifications from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A recurring timer elapsed
    TimerFired { timer: TimerId },

    /// The rendered document changed structurally
    DocumentChanged { observer: ObserverId },

    /// The user pressed the overlay's acknowledgement control
    OverlayAcknowledged { element_id: String },
}

/// Where the user currently is inside the host application
pub trait LocationSource: Send + Sync {
    /// The full in-app location, URL-like
    fn current_location(&self) -> String;
}

/// The surface overlays are drawn on
pub trait OverlaySurface: Send + Sync {
    /// Draw the overlay. The element is identified by `view.element_id`.
    fn render(&self, view: &OverlayView) -> HostResult<()>;

    /// Remove the element with this id. Returns true if one was removed.
    fn remove(&self, element_id: &str) -> bool;

    fn is_present(&self, element_id: &str) -> bool;
}

/// Moves the browsing context elsewhere
pub trait Navigator: Send + Sync {
    fn redirect(&self, location: &str) -> HostResult<()>;
}

/// Notifies about structural document changes.
///
/// Registered observers produce [`HostEvent::DocumentChanged`] until
/// disconnected.
pub trait DocumentObserver: Send + Sync {
    fn observe(&self) -> HostResult<ObserverId>;

    fn disconnect(&self, observer: ObserverId);
}

/// Recurring timers.
///
/// A running timer produces [`HostEvent::TimerFired`] once per period, the
/// first one a full period after registration.
pub trait Scheduler: Send + Sync {
    fn start_repeating(&self, period: Duration) -> HostResult<TimerId>;

    /// Cancel a timer. Cancelling an unknown or already cancelled timer is a no-op.
    fn cancel(&self, timer: TimerId);
}

/// Delivers host events to the driver loop
pub trait HostEventSource: Send + Sync {
    /// Take the event receiver. Only one subscriber is supported.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<HostEvent>;
}

/// Resolve a navigation target against the current location.
///
/// Absolute targets (with a scheme) are returned unchanged, root-relative
/// targets keep the current origin, anything else is returned as-is.
pub fn resolve_location(current: &str, target: &str) -> String {
    if target.contains("://") || !target.starts_with('/') {
        return target.to_string();
    }

    match current.find("://") {
        Some(scheme_end) => {
            let after_scheme = scheme_end + 3;
            let origin_end = current[after_scheme..]
                .find('/')
                .map(|i| after_scheme + i)
                .unwrap_or(current.len());
            format!("{}{}", &current[..origin_end], target)
        }
        None => target.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_root_relative_keeps_origin() {
        assert_eq!(
            resolve_location("https://www.instagram.com/reels/abc/", "/"),
            "https://www.instagram.com/"
        );
        assert_eq!(
            resolve_location("https://www.instagram.com", "/explore"),
            "https://www.instagram.com/explore"
        );
    }

    #[test]
    fn resolve_absolute_and_bare_targets() {
        assert_eq!(
            resolve_location("https://a.example/reels", "https://b.example/"),
            "https://b.example/"
        );
        assert_eq!(resolve_location("/reels/abc", "/"), "/");
    }

    #[test]
    fn host_error_converts_to_workspace_error() {
        let err: ReelguardError = HostError::RenderFailed("no body".into()).into();
        assert!(matches!(err, ReelguardError::HostError(_)));
    }
}

//! Overlay presenter

use reelguard_config::OverlayCopy;
use reelguard_host_api::{Navigator, OverlayMode, OverlaySurface, OverlayView};
use reelguard_store::{SessionStore, TrackingSession};
use reelguard_util::EpochMillis;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::CoreResult;

/// Result of the user dismissing the overlay
#[derive(Debug, Clone, PartialEq)]
pub struct Acknowledgement {
    pub finished: bool,
    /// Where the hard stop sent the user, if it happened
    pub redirected_to: Option<String>,
    /// The session after its last-warning time was stamped
    pub session: Option<TrackingSession>,
}

/// Renders and removes the single enforcement overlay.
pub struct OverlayPresenter {
    surface: Arc<dyn OverlaySurface>,
    navigator: Arc<dyn Navigator>,
    copy: OverlayCopy,
    home_location: String,
    showing: Option<OverlayMode>,
}

impl OverlayPresenter {
    pub fn new(
        surface: Arc<dyn OverlaySurface>,
        navigator: Arc<dyn Navigator>,
        copy: OverlayCopy,
        home_location: impl Into<String>,
    ) -> Self {
        Self {
            surface,
            navigator,
            copy,
            home_location: home_location.into(),
            showing: None,
        }
    }

    pub fn element_id(&self) -> &str {
        &self.copy.element_id
    }

    /// Mode of the overlay this presenter last put on screen, if still up
    pub fn showing(&self) -> Option<OverlayMode> {
        self.showing
    }

    /// Replace any existing overlay with a fresh one.
    pub fn show(&mut self, remaining_minutes: f64, finished: bool) -> CoreResult<OverlayView> {
        self.remove();

        let view = self.build_view(remaining_minutes, finished);
        self.surface.render(&view)?;
        self.showing = Some(view.mode);

        debug!(
            element_id = %view.element_id,
            mode = ?view.mode,
            remaining_minutes = view.remaining_minutes,
            "Overlay shown"
        );
        Ok(view)
    }

    /// Remove the overlay if present. Returns true if one was removed.
    pub fn remove(&mut self) -> bool {
        self.showing = None;
        self.surface.remove(&self.copy.element_id)
    }

    /// Handle a press of the overlay's acknowledgement control.
    ///
    /// Returns `None` when the press does not belong to a visible overlay of
    /// ours. A finished overlay always sends the user to the home location.
    /// The session's last-warning time is stamped either way; a failed write
    /// is logged and leaves `session` empty.
    pub fn acknowledge(
        &mut self,
        element_id: &str,
        sessions: &SessionStore,
        now: EpochMillis,
    ) -> Option<Acknowledgement> {
        if element_id != self.copy.element_id {
            return None;
        }

        let mode = match self.showing {
            Some(mode) => mode,
            None if self.surface.is_present(element_id) => OverlayMode::Warning,
            None => {
                debug!(element_id, "Ignoring acknowledgement with no overlay up");
                return None;
            }
        };
        self.remove();

        let finished = mode == OverlayMode::Finished;
        let mut redirected_to = None;
        if finished {
            match self.navigator.redirect(&self.home_location) {
                Ok(()) => {
                    info!(location = %self.home_location, "Budget exhausted, leaving section");
                    redirected_to = Some(self.home_location.clone());
                }
                Err(e) => warn!(error = %e, "Failed to leave section after hard stop"),
            }
        }

        let session = match sessions.record_acknowledgement(now) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Failed to record acknowledgement");
                None
            }
        };
        Some(Acknowledgement {
            finished,
            redirected_to,
            session,
        })
    }

    fn build_view(&self, remaining_minutes: f64, finished: bool) -> OverlayView {
        let (mode, message) = if finished {
            (OverlayMode::Finished, self.copy.finished_message.clone())
        } else {
            (OverlayMode::Warning, String::new())
        };

        OverlayView {
            element_id: self.copy.element_id.clone(),
            mode,
            remaining_minutes: round_minutes(remaining_minutes),
            headline: self.copy.headline.clone(),
            message,
            unit_label: self.copy.unit_label.clone(),
            acknowledge_label: self.copy.acknowledge_label.clone(),
        }
    }
}

fn round_minutes(minutes: f64) -> i64 {
    if minutes.is_finite() && minutes > 0.0 {
        minutes.round() as i64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelguard_host_api::MockHost;
    use reelguard_store::MemoryStorage;

    const T0: EpochMillis = EpochMillis::new(1_700_000_000_000);

    fn setup() -> (Arc<MockHost>, SessionStore, OverlayPresenter) {
        let host = Arc::new(MockHost::new("https://www.instagram.com/reels/abc/"));
        let sessions = SessionStore::new(Arc::new(MemoryStorage::new()), "reelsTimeTracker");
        let presenter =
            OverlayPresenter::new(host.clone(), host.clone(), OverlayCopy::default(), "/");
        (host, sessions, presenter)
    }

    #[test]
    fn show_replaces_existing_overlay() {
        let (host, _sessions, mut presenter) = setup();

        presenter.show(4.4, false).unwrap();
        let view = presenter.show(3.6, false).unwrap();

        assert_eq!(host.overlay_count(), 1);
        assert_eq!(view.remaining_minutes, 4);
        assert_eq!(host.overlay("reels-time-overlay"), Some(view));
        assert_eq!(host.rendered().len(), 2);
    }

    #[test]
    fn stale_overlay_from_elsewhere_is_removed_first() {
        let (host, _sessions, mut presenter) = setup();
        let mut stale = presenter.build_view(1.0, false);
        stale.headline = "left over".into();
        host.render(&stale).unwrap();

        presenter.show(2.0, false).unwrap();
        assert_eq!(host.overlay("reels-time-overlay").unwrap().headline, OverlayCopy::default().headline);
    }

    #[test]
    fn finished_view_carries_message() {
        let (_host, _sessions, mut presenter) = setup();
        let view = presenter.show(0.0, true).unwrap();
        assert_eq!(view.mode, OverlayMode::Finished);
        assert_eq!(view.remaining_minutes, 0);
        assert_eq!(view.message, OverlayCopy::default().finished_message);
    }

    #[test]
    fn acknowledging_warning_stamps_session_without_redirect() {
        let (host, sessions, mut presenter) = setup();
        let session = TrackingSession::new(T0, 9.0);
        sessions.save(&session).unwrap();

        presenter.show(8.0, false).unwrap();
        let now = T0 + std::time::Duration::from_secs(30);
        let ack = presenter
            .acknowledge("reels-time-overlay", &sessions, now)
            .unwrap();

        assert!(!ack.finished);
        assert!(ack.redirected_to.is_none());
        assert!(host.redirects().is_empty());
        assert_eq!(host.overlay_count(), 0);

        let stored = sessions.load().unwrap();
        assert_eq!(stored.last_warning_time, now);
        assert_eq!(stored.start_time, session.start_time);
        assert_eq!(stored.total_budget_minutes, session.total_budget_minutes);
    }

    #[test]
    fn acknowledging_finished_redirects_home() {
        let (host, sessions, mut presenter) = setup();
        sessions.save(&TrackingSession::new(T0, 2.0)).unwrap();

        presenter.show(0.0, true).unwrap();
        let ack = presenter
            .acknowledge("reels-time-overlay", &sessions, T0)
            .unwrap();

        assert!(ack.finished);
        assert_eq!(ack.redirected_to.as_deref(), Some("/"));
        assert_eq!(host.redirects(), vec!["https://www.instagram.com/".to_string()]);
    }

    #[test]
    fn unrelated_or_repeated_acknowledgements_are_ignored() {
        let (_host, sessions, mut presenter) = setup();
        presenter.show(1.0, false).unwrap();

        assert!(presenter.acknowledge("other", &sessions, T0).is_none());
        assert!(presenter.acknowledge("reels-time-overlay", &sessions, T0).is_some());
        assert!(presenter.acknowledge("reels-time-overlay", &sessions, T0).is_none());
    }

    #[test]
    fn failed_stamp_still_closes_and_redirects() {
        let host = Arc::new(MockHost::new("https://www.instagram.com/reels/abc/"));
        let storage = Arc::new(MemoryStorage::new());
        let sessions = SessionStore::new(storage.clone(), "reelsTimeTracker");
        let mut presenter =
            OverlayPresenter::new(host.clone(), host.clone(), OverlayCopy::default(), "/");
        sessions.save(&TrackingSession::new(T0, 2.0)).unwrap();
        presenter.show(0.0, true).unwrap();

        *storage.fail_writes.lock().unwrap() = true;
        let ack = presenter
            .acknowledge("reels-time-overlay", &sessions, T0 + std::time::Duration::from_secs(5))
            .unwrap();

        assert!(ack.finished);
        assert_eq!(ack.redirected_to.as_deref(), Some("/"));
        assert!(ack.session.is_none());
        assert_eq!(host.overlay_count(), 0);
        assert_eq!(host.redirects().len(), 1);
        assert_eq!(sessions.load().unwrap().last_warning_time, EpochMillis::ZERO);
    }

    #[test]
    fn render_failure_is_reported_and_nothing_is_showing() {
        let (host, _sessions, mut presenter) = setup();
        *host.fail_render.lock().unwrap() = true;

        assert!(presenter.show(1.0, false).is_err());
        assert!(presenter.showing().is_none());
    }

    #[test]
    fn rounding() {
        assert_eq!(round_minutes(2.5), 3);
        assert_eq!(round_minutes(2.49), 2);
        assert_eq!(round_minutes(-1.0), 0);
        assert_eq!(round_minutes(f64::NAN), 0);
    }
}

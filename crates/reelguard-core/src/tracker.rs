//! Tracker factory and handle
//!
//! Wires the classifier, session store, poller, presenter and watcher to a
//! host. Host events go in through [`ReelsTracker::handle_event`]; failures
//! inside a handler are logged and swallowed so one bad tick or render never
//! stops enforcement or reaches the host page.

use reelguard_config::{Policy, TrackerPolicy};
use reelguard_host_api::{
    DocumentObserver, HostBindings, HostEvent, LocationSource, OverlayMode, OverlayView,
};
use reelguard_store::{KeyValueStorage, SessionStore, TrackingSession};
use reelguard_util::{Clock, ObserverId, ReelguardError, TimerId};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    CoreEvent, CoreResult, EnforcementPoller, NavigationWatcher, OverlayPresenter, PollerState,
    Remaining, SectionClassifier, StartOutcome, TickOutcome, WatcherAction, WatcherState,
    remaining,
};

/// Point-in-time view of the tracker, for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerState {
    pub location: String,
    pub in_section: bool,
    pub watcher: WatcherState,
    pub poller: PollerState,
    pub budget_minutes: f64,
    pub session: Option<TrackingSession>,
    pub remaining: Remaining,
    pub overlay: Option<OverlayMode>,
    pub torn_down: bool,
}

pub struct ReelsTracker {
    policy: TrackerPolicy,
    classifier: SectionClassifier,
    sessions: SessionStore,
    clock: Arc<dyn Clock>,
    location: Arc<dyn LocationSource>,
    observer_host: Arc<dyn DocumentObserver>,
    observer: Option<ObserverId>,
    poller: EnforcementPoller,
    presenter: OverlayPresenter,
    watcher: NavigationWatcher,
    startup_events: Vec<CoreEvent>,
    torn_down: bool,
}

impl ReelsTracker {
    /// Create a tracker if the user is currently inside the monitored section.
    ///
    /// `budget_minutes` overrides the configured budget. Returns `Ok(None)`
    /// outside the section. Otherwise registers one document observer and
    /// starts enforcement for the current location.
    pub fn init(
        policy: &Policy,
        budget_minutes: Option<f64>,
        bindings: HostBindings,
        storage: Arc<dyn KeyValueStorage>,
        clock: Arc<dyn Clock>,
    ) -> CoreResult<Option<Self>> {
        let tracker_policy = policy.tracker.clone().with_budget(budget_minutes);
        let classifier = SectionClassifier::new(tracker_policy.section_markers.iter().cloned());

        let location = bindings.location.current_location();
        if !classifier.contains(&location) {
            debug!(location = %location, "Outside monitored section, not tracking");
            return Ok(None);
        }

        info!(
            location = %location,
            budget_minutes = tracker_policy.budget_minutes,
            "Initializing reels time tracker"
        );

        let sessions = SessionStore::new(storage, tracker_policy.storage_key.clone());
        let poller = EnforcementPoller::new(
            bindings.scheduler.clone(),
            tracker_policy.poll_interval,
            tracker_policy.warning_interval_cap_minutes,
        );
        let presenter = OverlayPresenter::new(
            bindings.overlay.clone(),
            bindings.navigator.clone(),
            policy.overlay.clone(),
            tracker_policy.home_location.clone(),
        );
        let observer = bindings.observer.observe()?;

        let mut tracker = Self {
            policy: tracker_policy,
            classifier,
            sessions,
            clock,
            location: bindings.location,
            observer_host: bindings.observer,
            observer: Some(observer),
            poller,
            presenter,
            watcher: NavigationWatcher::new(),
            startup_events: Vec::new(),
            torn_down: false,
        };
        tracker.startup_events = tracker.on_location_change();

        Ok(Some(tracker))
    }

    /// Events produced by the initial evaluation in `init`. Drained on the
    /// first call.
    pub fn take_startup_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.startup_events)
    }

    /// Budget left in the persisted session
    pub fn remaining(&self) -> Remaining {
        remaining(self.sessions.load().as_ref(), self.clock.now())
    }

    /// Put the warning overlay up right now, with the current remaining time
    /// (zero if there is no session).
    pub fn show_now(&mut self) -> CoreResult<OverlayView> {
        self.ensure_live()?;
        let minutes = self.remaining().minutes_or_zero();
        self.presenter.show(minutes, false)
    }

    /// Replace the session with a full budget period starting now,
    /// regardless of location.
    pub fn reset(&mut self) -> CoreResult<CoreEvent> {
        self.ensure_live()?;
        let now = self.clock.now();
        let outcome = self
            .poller
            .restart(self.policy.budget_minutes, &self.sessions, now)?;
        info!(
            budget_minutes = self.policy.budget_minutes,
            "Tracking session reset"
        );
        Ok(CoreEvent::SessionReset {
            session: *outcome.session(),
        })
    }

    /// Dispatch one host event
    pub fn handle_event(&mut self, event: HostEvent) -> Vec<CoreEvent> {
        if self.torn_down {
            debug!(?event, "Ignoring host event after teardown");
            return Vec::new();
        }

        match event {
            HostEvent::TimerFired { timer } => self.on_tick(timer),
            HostEvent::DocumentChanged { observer } => {
                if self.observer == Some(observer) {
                    self.on_location_change()
                } else {
                    debug!(%observer, "Ignoring change from unknown observer");
                    Vec::new()
                }
            }
            HostEvent::OverlayAcknowledged { element_id } => self.on_acknowledge(&element_id),
        }
    }

    /// Release every host resource: the enforcement timer, the document
    /// observer and any overlay on screen. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.poller.stop();
        if let Some(observer) = self.observer.take() {
            self.observer_host.disconnect(observer);
        }
        self.presenter.remove();
        self.torn_down = true;
        info!("Reels time tracker torn down");
    }

    pub fn state(&self) -> TrackerState {
        let location = self.location.current_location();
        let session = self.sessions.load();
        TrackerState {
            in_section: self.classifier.contains(&location),
            location,
            watcher: self.watcher.state(),
            poller: self.poller.state(),
            budget_minutes: self.policy.budget_minutes,
            remaining: remaining(session.as_ref(), self.clock.now()),
            session,
            overlay: self.presenter.showing(),
            torn_down: self.torn_down,
        }
    }

    pub fn policy(&self) -> &TrackerPolicy {
        &self.policy
    }

    fn ensure_live(&self) -> CoreResult<()> {
        if self.torn_down {
            Err(ReelguardError::TornDown)
        } else {
            Ok(())
        }
    }

    fn start_poller(&mut self) -> CoreResult<StartOutcome> {
        let now = self.clock.now();
        self.poller
            .start(self.policy.budget_minutes, &self.sessions, now)
    }

    fn on_location_change(&mut self) -> Vec<CoreEvent> {
        let location = self.location.current_location();
        let in_section = self.classifier.contains(&location);
        let mut events = Vec::new();

        match self.watcher.observe(&location, in_section) {
            WatcherAction::StartPoller => match self.start_poller() {
                Ok(outcome) => {
                    self.watcher.confirm(WatcherAction::StartPoller);
                    info!(
                        location = %location,
                        fresh = outcome.is_fresh(),
                        "Entered monitored section"
                    );
                    events.push(CoreEvent::TrackingStarted {
                        session: *outcome.session(),
                        fresh: outcome.is_fresh(),
                    });
                }
                Err(e) => warn!(location = %location, error = %e, "Failed to start tracking"),
            },
            WatcherAction::StopPoller => {
                self.poller.stop();
                self.watcher.confirm(WatcherAction::StopPoller);
                info!(location = %location, "Left monitored section");
                events.push(CoreEvent::TrackingStopped);
            }
            WatcherAction::None => {}
        }

        events
    }

    fn on_tick(&mut self, timer: TimerId) -> Vec<CoreEvent> {
        let in_section = self.classifier.contains(&self.location.current_location());
        let now = self.clock.now();

        match self.poller.tick(timer, in_section, &self.sessions, now) {
            TickOutcome::StaleTimer => {
                debug!(%timer, "Ignoring stale enforcement timer");
                Vec::new()
            }
            TickOutcome::Skipped(reason) => {
                debug!(?reason, "Enforcement check skipped");
                Vec::new()
            }
            TickOutcome::Quiet { remaining_minutes } => {
                debug!(remaining_minutes, "Enforcement check");
                Vec::new()
            }
            TickOutcome::Warn { remaining_minutes } => {
                match self.presenter.show(remaining_minutes, false) {
                    Ok(_) => {
                        info!(remaining_minutes, "Warning issued");
                        vec![CoreEvent::WarningShown { remaining_minutes }]
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to show warning overlay");
                        Vec::new()
                    }
                }
            }
            // Keep polling until the hard stop is actually on screen
            TickOutcome::Exhausted => match self.presenter.show(0.0, true) {
                Ok(_) => {
                    self.poller.stop();
                    info!("Budget exhausted");
                    vec![CoreEvent::BudgetExhausted]
                }
                Err(e) => {
                    warn!(error = %e, "Failed to show finished overlay");
                    Vec::new()
                }
            },
        }
    }

    fn on_acknowledge(&mut self, element_id: &str) -> Vec<CoreEvent> {
        let now = self.clock.now();
        match self.presenter.acknowledge(element_id, &self.sessions, now) {
            Some(ack) => {
                debug!(finished = ack.finished, "Overlay acknowledged");
                vec![CoreEvent::OverlayAcknowledged {
                    finished: ack.finished,
                    redirected_to: ack.redirected_to,
                }]
            }
            None => Vec::new(),
        }
    }
}

impl Drop for ReelsTracker {
    fn drop(&mut self) {
        self.teardown();
    }
}

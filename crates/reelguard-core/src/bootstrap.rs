//! Tracker bootstrap
//!
//! The tracker only exists while the user is in the monitored section. When
//! the app is opened elsewhere, the bootstrap keeps its own observer and
//! retries [`ReelsTracker::init`] on every document change until it succeeds.

use reelguard_config::Policy;
use reelguard_host_api::{HostBindings, HostEvent};
use reelguard_store::KeyValueStorage;
use reelguard_util::{Clock, ObserverId};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{CoreEvent, CoreResult, ReelsTracker};

pub struct TrackerBootstrap {
    policy: Policy,
    budget_minutes: Option<f64>,
    bindings: HostBindings,
    storage: Arc<dyn KeyValueStorage>,
    clock: Arc<dyn Clock>,
    tracker: Option<ReelsTracker>,
    waiting: Option<ObserverId>,
}

impl TrackerBootstrap {
    /// Try to create the tracker right away. If the user is outside the
    /// section, start watching for them to enter it.
    pub fn new(
        policy: Policy,
        budget_minutes: Option<f64>,
        bindings: HostBindings,
        storage: Arc<dyn KeyValueStorage>,
        clock: Arc<dyn Clock>,
    ) -> CoreResult<Self> {
        let mut bootstrap = Self {
            policy,
            budget_minutes,
            bindings,
            storage,
            clock,
            tracker: None,
            waiting: None,
        };

        bootstrap.try_init()?;
        if bootstrap.tracker.is_none() {
            let observer = bootstrap.bindings.observer.observe()?;
            debug!(%observer, "Waiting for the monitored section");
            bootstrap.waiting = Some(observer);
        }

        Ok(bootstrap)
    }

    pub fn tracker(&self) -> Option<&ReelsTracker> {
        self.tracker.as_ref()
    }

    pub fn tracker_mut(&mut self) -> Option<&mut ReelsTracker> {
        self.tracker.as_mut()
    }

    /// Events from a tracker created in `new`
    pub fn take_startup_events(&mut self) -> Vec<CoreEvent> {
        self.tracker
            .as_mut()
            .map(ReelsTracker::take_startup_events)
            .unwrap_or_default()
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting.is_some()
    }

    /// Route a host event to the tracker, or use it to retry creation
    pub fn handle_event(&mut self, event: HostEvent) -> Vec<CoreEvent> {
        if let Some(tracker) = self.tracker.as_mut() {
            return tracker.handle_event(event);
        }

        match event {
            HostEvent::DocumentChanged { observer } if self.waiting == Some(observer) => {
                if let Err(e) = self.try_init() {
                    warn!(error = %e, "Failed to start tracker");
                    return Vec::new();
                }
                let events = match self.tracker.as_mut() {
                    Some(tracker) => tracker.take_startup_events(),
                    None => return Vec::new(),
                };
                self.stop_waiting();
                events
            }
            other => {
                debug!(event = ?other, "No tracker yet, ignoring host event");
                Vec::new()
            }
        }
    }

    /// Tear down the tracker if one exists and stop waiting for one
    pub fn teardown(&mut self) {
        self.stop_waiting();
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.teardown();
        }
    }

    fn try_init(&mut self) -> CoreResult<()> {
        let tracker = ReelsTracker::init(
            &self.policy,
            self.budget_minutes,
            self.bindings.clone(),
            self.storage.clone(),
            self.clock.clone(),
        )?;
        if tracker.is_some() {
            info!("Tracker created");
        }
        self.tracker = tracker;
        Ok(())
    }

    fn stop_waiting(&mut self) {
        if let Some(observer) = self.waiting.take() {
            self.bindings.observer.disconnect(observer);
        }
    }
}

//! Enforcement poller
//!
//! Owns the single recurring enforcement timer. `start` registers the new
//! timer before cancelling the previous one, so a failed start leaves the
//! running poller untouched and at most one poller timer stays live.

use reelguard_host_api::Scheduler;
use reelguard_store::{SessionStore, TrackingSession};
use reelguard_util::{EpochMillis, TimerId};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::{CoreResult, Remaining, remaining, warning_interval_minutes};

/// Poller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PollerState {
    Stopped,
    Running { timer: TimerId },
}

/// How `start` found the persisted session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartOutcome {
    /// No usable session, or the previous one was used up: a new one began now
    Created(TrackingSession),
    /// The existing session still had budget and was kept as-is
    Resumed(TrackingSession),
}

impl StartOutcome {
    pub fn session(&self) -> &TrackingSession {
        match self {
            StartOutcome::Created(s) | StartOutcome::Resumed(s) => s,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, StartOutcome::Created(_))
    }
}

/// Why a tick took no action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OutsideSection,
    NoSession,
}

/// Decision for one enforcement check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The timer is not the poller's current one
    StaleTimer,
    Skipped(SkipReason),
    /// Budget left but the last warning was too recent
    Quiet { remaining_minutes: f64 },
    /// Budget left and a warning is due
    Warn { remaining_minutes: f64 },
    /// Budget used up. The caller stops the poller once the user has been told.
    Exhausted,
}

pub struct EnforcementPoller {
    scheduler: Arc<dyn Scheduler>,
    interval: Duration,
    warning_cap_minutes: f64,
    budget_minutes: f64,
    timer: Option<TimerId>,
}

impl EnforcementPoller {
    pub fn new(scheduler: Arc<dyn Scheduler>, interval: Duration, warning_cap_minutes: f64) -> Self {
        Self {
            scheduler,
            interval,
            warning_cap_minutes,
            budget_minutes: 0.0,
            timer: None,
        }
    }

    pub fn state(&self) -> PollerState {
        match self.timer {
            Some(timer) => PollerState::Running { timer },
            None => PollerState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Budget passed to the most recent `start`
    pub fn budget_minutes(&self) -> f64 {
        self.budget_minutes
    }

    pub fn warning_interval_minutes(&self) -> f64 {
        warning_interval_minutes(self.budget_minutes, self.warning_cap_minutes)
    }

    /// Begin enforcing `budget_minutes`.
    ///
    /// Keeps the persisted session if it still has budget, otherwise replaces
    /// it with one starting at `now`. A previously running timer is cancelled
    /// only once the new one is registered; on error it keeps running.
    pub fn start(
        &mut self,
        budget_minutes: f64,
        sessions: &SessionStore,
        now: EpochMillis,
    ) -> CoreResult<StartOutcome> {
        self.begin(budget_minutes, sessions, now, false)
    }

    /// Like `start`, but always begins a new session at `now`
    pub fn restart(
        &mut self,
        budget_minutes: f64,
        sessions: &SessionStore,
        now: EpochMillis,
    ) -> CoreResult<StartOutcome> {
        self.begin(budget_minutes, sessions, now, true)
    }

    fn begin(
        &mut self,
        budget_minutes: f64,
        sessions: &SessionStore,
        now: EpochMillis,
        replace: bool,
    ) -> CoreResult<StartOutcome> {
        let timer = self.scheduler.start_repeating(self.interval)?;

        let existing = sessions.load();
        let outcome = match existing {
            Some(session) if !replace && !remaining(Some(&session), now).is_exhausted() => {
                StartOutcome::Resumed(session)
            }
            _ => {
                let session = TrackingSession::new(now, budget_minutes);
                if let Err(e) = sessions.save(&session) {
                    self.scheduler.cancel(timer);
                    return Err(e.into());
                }
                info!(
                    budget_minutes,
                    start_time = %session.start_time,
                    replaced_expired = existing.is_some(),
                    "Tracking session created"
                );
                StartOutcome::Created(session)
            }
        };

        self.release();
        self.timer = Some(timer);
        self.budget_minutes = budget_minutes;
        debug!(%timer, interval_secs = self.interval.as_secs(), "Enforcement poller running");

        Ok(outcome)
    }

    /// Stop polling. The persisted session is left alone.
    ///
    /// Returns true if a timer was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.release();
        if was_running {
            debug!("Enforcement poller stopped");
        }
        was_running
    }

    fn release(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => {
                self.scheduler.cancel(timer);
                true
            }
            None => false,
        }
    }

    /// Run one enforcement check for `timer`.
    pub fn tick(
        &mut self,
        timer: TimerId,
        in_section: bool,
        sessions: &SessionStore,
        now: EpochMillis,
    ) -> TickOutcome {
        if self.timer != Some(timer) {
            return TickOutcome::StaleTimer;
        }

        if !in_section {
            return TickOutcome::Skipped(SkipReason::OutsideSection);
        }

        let session = sessions.load();
        let remaining_minutes = match remaining(session.as_ref(), now) {
            Remaining::Unknown => return TickOutcome::Skipped(SkipReason::NoSession),
            Remaining::Minutes(m) => m,
        };

        if remaining_minutes <= 0.0 {
            return TickOutcome::Exhausted;
        }

        let since_warning = session
            .map(|s| s.minutes_since_warning(now))
            .unwrap_or(f64::INFINITY);
        if since_warning >= self.warning_interval_minutes() {
            TickOutcome::Warn { remaining_minutes }
        } else {
            TickOutcome::Quiet { remaining_minutes }
        }
    }
}

impl Drop for EnforcementPoller {
    fn drop(&mut self) {
        self.release();
    }
}

//! Navigation watcher
//!
//! The host app swaps content without page loads, so location changes are
//! detected by re-reading the location whenever the document changes and
//! comparing it with the last one seen.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatcherState {
    Idle,
    Tracking,
}

/// What the tracker should do with the poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherAction {
    None,
    StartPoller,
    StopPoller,
}

#[derive(Debug)]
pub struct NavigationWatcher {
    state: WatcherState,
    last_location: Option<String>,
}

impl NavigationWatcher {
    pub fn new() -> Self {
        Self {
            state: WatcherState::Idle,
            last_location: None,
        }
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn last_location(&self) -> Option<&str> {
        self.last_location.as_deref()
    }

    /// Look at the current location after a document change.
    ///
    /// Only a location different from the last one seen can produce an
    /// action. The first call always evaluates.
    pub fn observe(&mut self, location: &str, in_section: bool) -> WatcherAction {
        if self.last_location.as_deref() == Some(location) {
            return WatcherAction::None;
        }
        self.last_location = Some(location.to_string());

        match (self.state, in_section) {
            (WatcherState::Idle, true) => WatcherAction::StartPoller,
            (WatcherState::Tracking, false) => WatcherAction::StopPoller,
            _ => WatcherAction::None,
        }
    }

    /// Record that the action returned by `observe` was carried out
    pub fn confirm(&mut self, action: WatcherAction) {
        match action {
            WatcherAction::StartPoller => self.state = WatcherState::Tracking,
            WatcherAction::StopPoller => self.state = WatcherState::Idle,
            WatcherAction::None => {}
        }
    }
}

impl Default for NavigationWatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(w: &mut NavigationWatcher, location: &str, in_section: bool) -> WatcherAction {
        let action = w.observe(location, in_section);
        w.confirm(action);
        action
    }

    #[test]
    fn enter_and_leave() {
        let mut w = NavigationWatcher::new();
        assert_eq!(step(&mut w, "/reels/a", true), WatcherAction::StartPoller);
        assert_eq!(w.state(), WatcherState::Tracking);

        assert_eq!(step(&mut w, "/", false), WatcherAction::StopPoller);
        assert_eq!(w.state(), WatcherState::Idle);
    }

    #[test]
    fn moving_within_section_does_not_restart() {
        let mut w = NavigationWatcher::new();
        step(&mut w, "/reels/a", true);
        assert_eq!(step(&mut w, "/reels/b", true), WatcherAction::None);
        assert_eq!(w.state(), WatcherState::Tracking);
    }

    #[test]
    fn unchanged_location_is_ignored() {
        let mut w = NavigationWatcher::new();
        step(&mut w, "/", false);
        assert_eq!(step(&mut w, "/", false), WatcherAction::None);
        assert_eq!(w.last_location(), Some("/"));
    }

    #[test]
    fn unconfirmed_start_is_retried_on_next_change() {
        let mut w = NavigationWatcher::new();
        assert_eq!(w.observe("/reels/a", true), WatcherAction::StartPoller);
        assert_eq!(w.state(), WatcherState::Idle);
        assert_eq!(w.observe("/reels/b", true), WatcherAction::StartPoller);
    }
}

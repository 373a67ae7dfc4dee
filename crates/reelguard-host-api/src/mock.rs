//! Mock host for testing

use reelguard_util::{IdAllocator, ObserverId, TimerId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::{
    DocumentObserver, HostError, HostEvent, HostEventSource, HostResult, LocationSource,
    Navigator, OverlaySurface, OverlayView, Scheduler, resolve_location,
};

/// In-process stand-in for a page: records every interaction and lets tests
/// drive navigation, timer ticks and overlay clicks by hand.
pub struct MockHost {
    ids: IdAllocator,
    location: Mutex<String>,
    overlays: Mutex<HashMap<String, OverlayView>>,
    rendered: Mutex<Vec<OverlayView>>,
    redirects: Mutex<Vec<String>>,
    timers: Mutex<BTreeMap<TimerId, Duration>>,
    cancelled: Mutex<Vec<TimerId>>,
    observers: Mutex<BTreeSet<ObserverId>>,
    event_tx: mpsc::UnboundedSender<HostEvent>,
    event_rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<HostEvent>>>>,

    /// Configure render to fail
    pub fail_render: Arc<Mutex<bool>>,

    /// Configure timer registration to fail
    pub fail_schedule: Arc<Mutex<bool>>,
}

impl MockHost {
    pub fn new(location: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            ids: IdAllocator::new(),
            location: Mutex::new(location.into()),
            overlays: Mutex::new(HashMap::new()),
            rendered: Mutex::new(Vec::new()),
            redirects: Mutex::new(Vec::new()),
            timers: Mutex::new(BTreeMap::new()),
            cancelled: Mutex::new(Vec::new()),
            observers: Mutex::new(BTreeSet::new()),
            event_tx: tx,
            event_rx: Arc::new(Mutex::new(Some(rx))),
            fail_render: Arc::new(Mutex::new(false)),
            fail_schedule: Arc::new(Mutex::new(false)),
        }
    }

    /// Change location without notifying observers
    pub fn set_location(&self, location: impl Into<String>) {
        *self.location.lock().unwrap() = location.into();
    }

    /// Change location the way an in-app navigation does: the document
    /// re-renders and every connected observer is notified.
    pub fn navigate(&self, location: impl Into<String>) -> Vec<HostEvent> {
        self.set_location(location);
        self.document_changed()
    }

    /// Notify every connected observer of a document change
    pub fn document_changed(&self) -> Vec<HostEvent> {
        let events: Vec<HostEvent> = self
            .observers
            .lock()
            .unwrap()
            .iter()
            .map(|&observer| HostEvent::DocumentChanged { observer })
            .collect();
        for event in &events {
            let _ = self.event_tx.send(event.clone());
        }
        events
    }

    /// Fire every active timer once
    pub fn fire_timers(&self) -> Vec<HostEvent> {
        let events: Vec<HostEvent> = self
            .active_timers()
            .into_iter()
            .map(|timer| HostEvent::TimerFired { timer })
            .collect();
        for event in &events {
            let _ = self.event_tx.send(event.clone());
        }
        events
    }

    /// Press the acknowledgement control of a visible overlay
    pub fn click_acknowledge(&self, element_id: &str) -> Option<HostEvent> {
        if !self.is_present(element_id) {
            return None;
        }
        let event = HostEvent::OverlayAcknowledged {
            element_id: element_id.to_string(),
        };
        let _ = self.event_tx.send(event.clone());
        Some(event)
    }

    pub fn active_timers(&self) -> Vec<TimerId> {
        self.timers.lock().unwrap().keys().copied().collect()
    }

    pub fn timer_period(&self, timer: TimerId) -> Option<Duration> {
        self.timers.lock().unwrap().get(&timer).copied()
    }

    pub fn cancelled_timers(&self) -> Vec<TimerId> {
        self.cancelled.lock().unwrap().clone()
    }

    pub fn observers(&self) -> Vec<ObserverId> {
        self.observers.lock().unwrap().iter().copied().collect()
    }

    /// Every overlay ever rendered, oldest first
    pub fn rendered(&self) -> Vec<OverlayView> {
        self.rendered.lock().unwrap().clone()
    }

    /// The overlay currently on screen under this id
    pub fn overlay(&self, element_id: &str) -> Option<OverlayView> {
        self.overlays.lock().unwrap().get(element_id).cloned()
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.lock().unwrap().len()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl LocationSource for MockHost {
    fn current_location(&self) -> String {
        self.location.lock().unwrap().clone()
    }
}

impl OverlaySurface for MockHost {
    fn render(&self, view: &OverlayView) -> HostResult<()> {
        if *self.fail_render.lock().unwrap() {
            return Err(HostError::RenderFailed("Mock render failure".into()));
        }

        let mut overlays = self.overlays.lock().unwrap();
        if overlays.contains_key(&view.element_id) {
            return Err(HostError::RenderFailed(format!(
                "duplicate element id '{}'",
                view.element_id
            )));
        }
        overlays.insert(view.element_id.clone(), view.clone());
        self.rendered.lock().unwrap().push(view.clone());
        Ok(())
    }

    fn remove(&self, element_id: &str) -> bool {
        self.overlays.lock().unwrap().remove(element_id).is_some()
    }

    fn is_present(&self, element_id: &str) -> bool {
        self.overlays.lock().unwrap().contains_key(element_id)
    }
}

impl Navigator for MockHost {
    fn redirect(&self, location: &str) -> HostResult<()> {
        let resolved = resolve_location(&self.current_location(), location);
        self.redirects.lock().unwrap().push(resolved.clone());
        self.set_location(resolved);
        Ok(())
    }
}

impl DocumentObserver for MockHost {
    fn observe(&self) -> HostResult<ObserverId> {
        let id = self.ids.next_observer();
        self.observers.lock().unwrap().insert(id);
        Ok(id)
    }

    fn disconnect(&self, observer: ObserverId) {
        self.observers.lock().unwrap().remove(&observer);
    }
}

impl Scheduler for MockHost {
    fn start_repeating(&self, period: Duration) -> HostResult<TimerId> {
        if *self.fail_schedule.lock().unwrap() {
            return Err(HostError::ScheduleFailed("Mock schedule failure".into()));
        }
        let id = self.ids.next_timer();
        self.timers.lock().unwrap().insert(id, period);
        Ok(id)
    }

    fn cancel(&self, timer: TimerId) {
        if self.timers.lock().unwrap().remove(&timer).is_some() {
            self.cancelled.lock().unwrap().push(timer);
        }
    }
}

impl HostEventSource for MockHost {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<HostEvent> {
        self.event_rx
            .lock()
            .unwrap()
            .take()
            .expect("subscribe() can only be called once")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OverlayMode;

    fn view() -> OverlayView {
        OverlayView {
            element_id: "reels-time-overlay".into(),
            mode: OverlayMode::Warning,
            remaining_minutes: 2,
            headline: "h".into(),
            message: String::new(),
            unit_label: "mins left".into(),
            acknowledge_label: "Close".into(),
        }
    }

    #[test]
    fn timers_register_and_cancel() {
        let host = MockHost::new("https://www.instagram.com/reels/");
        let t = host.start_repeating(Duration::from_secs(10)).unwrap();
        assert_eq!(host.active_timers(), vec![t]);
        assert_eq!(host.timer_period(t), Some(Duration::from_secs(10)));

        host.cancel(t);
        host.cancel(t);
        assert!(host.active_timers().is_empty());
        assert_eq!(host.cancelled_timers(), vec![t]);
    }

    #[test]
    fn render_rejects_duplicate_element() {
        let host = MockHost::new("/");
        host.render(&view()).unwrap();
        assert!(host.render(&view()).is_err());

        assert!(host.remove("reels-time-overlay"));
        assert!(!host.remove("reels-time-overlay"));
        host.render(&view()).unwrap();
        assert_eq!(host.rendered().len(), 2);
    }

    #[test]
    fn navigation_notifies_connected_observers() {
        let host = MockHost::new("https://www.instagram.com/");
        let mut rx = host.subscribe();
        let observer = host.observe().unwrap();

        let events = host.navigate("https://www.instagram.com/reels/");
        assert_eq!(events, vec![HostEvent::DocumentChanged { observer }]);
        assert_eq!(rx.try_recv().unwrap(), HostEvent::DocumentChanged { observer });

        host.disconnect(observer);
        assert!(host.navigate("https://www.instagram.com/").is_empty());
    }

    #[test]
    fn redirect_resolves_against_origin() {
        let host = MockHost::new("https://www.instagram.com/reels/abc/");
        host.redirect("/").unwrap();
        assert_eq!(host.current_location(), "https://www.instagram.com/");
        assert_eq!(host.redirects(), vec!["https://www.instagram.com/".to_string()]);
    }

    #[test]
    fn acknowledge_requires_visible_overlay() {
        let host = MockHost::new("/");
        assert!(host.click_acknowledge("reels-time-overlay").is_none());
        host.render(&view()).unwrap();
        assert!(host.click_acknowledge("reels-time-overlay").is_some());
    }
}

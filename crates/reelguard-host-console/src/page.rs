//! Simulated page on a terminal

use reelguard_host_api::{
    DocumentObserver, HostError, HostEvent, HostEventSource, HostResult, LocationSource,
    Navigator, OverlaySurface, OverlayView, Scheduler, resolve_location,
};
use reelguard_util::{IdAllocator, ObserverId, TimerId};
use std::collections::{BTreeSet, HashMap};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::TokioScheduler;

/// A page the user drives from the keyboard.
///
/// Location changes come from [`ConsoleHost::navigate`] or from redirects
/// and notify every connected document observer. Overlays are written to
/// the output as framed text blocks.
pub struct ConsoleHost {
    ids: IdAllocator,
    location: Mutex<String>,
    overlays: Mutex<HashMap<String, OverlayView>>,
    observers: Mutex<BTreeSet<ObserverId>>,
    scheduler: TokioScheduler,
    out: Mutex<Box<dyn Write + Send>>,
    event_tx: mpsc::UnboundedSender<HostEvent>,
    event_rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<HostEvent>>>>,
}

impl ConsoleHost {
    /// Page writing to stdout
    pub fn new(location: impl Into<String>) -> Self {
        Self::with_writer(location, Box::new(io::stdout()))
    }

    pub fn with_writer(location: impl Into<String>, out: Box<dyn Write + Send>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            ids: IdAllocator::new(),
            location: Mutex::new(location.into()),
            overlays: Mutex::new(HashMap::new()),
            observers: Mutex::new(BTreeSet::new()),
            scheduler: TokioScheduler::new(tx.clone()),
            out: Mutex::new(out),
            event_tx: tx,
            event_rx: Arc::new(Mutex::new(Some(rx))),
        }
    }

    /// Move to `target` the way an in-app link would. Relative targets
    /// resolve against the current origin.
    pub fn navigate(&self, target: &str) -> String {
        let resolved = resolve_location(&self.current_location(), target);
        *self.location.lock().unwrap() = resolved.clone();
        debug!(location = %resolved, "Navigated");
        self.notify_observers();
        resolved
    }

    /// Press the acknowledgement control of the overlay with this id.
    /// Returns false if no such overlay is on screen.
    pub fn acknowledge(&self, element_id: &str) -> bool {
        if !self.is_present(element_id) {
            return false;
        }
        let _ = self.event_tx.send(HostEvent::OverlayAcknowledged {
            element_id: element_id.to_string(),
        });
        true
    }

    /// Ids of the overlays currently on screen
    pub fn visible_overlays(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.overlays.lock().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn active_timers(&self) -> usize {
        self.scheduler.active_timers()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().unwrap().len()
    }

    /// Write a line to the page's output
    pub fn print(&self, text: &str) -> HostResult<()> {
        let mut out = self.out.lock().unwrap();
        writeln!(out, "{}", text)?;
        out.flush()?;
        Ok(())
    }

    fn notify_observers(&self) {
        for &observer in self.observers.lock().unwrap().iter() {
            let _ = self.event_tx.send(HostEvent::DocumentChanged { observer });
        }
    }
}

fn frame(text: &str) -> String {
    let width = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let rule = format!("+{}+", "-".repeat(width + 2));
    let mut framed = vec![rule.clone()];
    for line in text.lines() {
        framed.push(format!("| {:<width$} |", line, width = width));
    }
    framed.push(rule);
    framed.join("\n")
}

impl LocationSource for ConsoleHost {
    fn current_location(&self) -> String {
        self.location.lock().unwrap().clone()
    }
}

impl OverlaySurface for ConsoleHost {
    fn render(&self, view: &OverlayView) -> HostResult<()> {
        {
            let mut overlays = self.overlays.lock().unwrap();
            if overlays.contains_key(&view.element_id) {
                return Err(HostError::RenderFailed(format!(
                    "duplicate element id '{}'",
                    view.element_id
                )));
            }
            overlays.insert(view.element_id.clone(), view.clone());
        }

        let text = format!(
            "{}\n(type 'ack' to press [{}])",
            frame(&view.to_text()),
            view.acknowledge_label
        );
        if let Err(e) = self.print(&text) {
            self.overlays.lock().unwrap().remove(&view.element_id);
            return Err(HostError::RenderFailed(e.to_string()));
        }
        Ok(())
    }

    fn remove(&self, element_id: &str) -> bool {
        self.overlays.lock().unwrap().remove(element_id).is_some()
    }

    fn is_present(&self, element_id: &str) -> bool {
        self.overlays.lock().unwrap().contains_key(element_id)
    }
}

impl Navigator for ConsoleHost {
    fn redirect(&self, location: &str) -> HostResult<()> {
        let resolved = self.navigate(location);
        info!(location = %resolved, "Redirected");
        self.print(&format!("-> {}", resolved))
    }
}

impl DocumentObserver for ConsoleHost {
    fn observe(&self) -> HostResult<ObserverId> {
        let id = self.ids.next_observer();
        self.observers.lock().unwrap().insert(id);
        debug!(observer = %id, "Observer connected");
        Ok(id)
    }

    fn disconnect(&self, observer: ObserverId) {
        if self.observers.lock().unwrap().remove(&observer) {
            debug!(%observer, "Observer disconnected");
        }
    }
}

impl Scheduler for ConsoleHost {
    fn start_repeating(&self, period: Duration) -> HostResult<TimerId> {
        self.scheduler.start_repeating(period)
    }

    fn cancel(&self, timer: TimerId) {
        self.scheduler.cancel(timer)
    }
}

impl HostEventSource for ConsoleHost {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<HostEvent> {
        self.event_rx
            .lock()
            .unwrap()
            .take()
            .expect("subscribe() can only be called once")
    }
}

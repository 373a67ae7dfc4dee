//! Recurring timers on the tokio runtime

use reelguard_host_api::{HostError, HostEvent, HostResult, Scheduler};
use reelguard_util::{IdAllocator, TimerId};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Each timer is a task that sends [`HostEvent::TimerFired`] once per
/// period until cancelled. Must be used from inside a tokio runtime.
pub struct TokioScheduler {
    ids: IdAllocator,
    tasks: Mutex<HashMap<TimerId, JoinHandle<()>>>,
    event_tx: mpsc::UnboundedSender<HostEvent>,
}

impl TokioScheduler {
    pub fn new(event_tx: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self {
            ids: IdAllocator::new(),
            tasks: Mutex::new(HashMap::new()),
            event_tx,
        }
    }

    pub fn active_timers(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }
}

impl Scheduler for TokioScheduler {
    fn start_repeating(&self, period: Duration) -> HostResult<TimerId> {
        if period.is_zero() {
            return Err(HostError::ScheduleFailed("period must be non-zero".into()));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| HostError::ScheduleFailed(e.to_string()))?;

        let timer = self.ids.next_timer();
        let event_tx = self.event_tx.clone();

        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                trace!(%timer, "Timer fired");
                if event_tx.send(HostEvent::TimerFired { timer }).is_err() {
                    break;
                }
            }
        });

        self.tasks.lock().unwrap().insert(timer, task);
        debug!(%timer, period_ms = period.as_millis() as u64, "Timer started");
        Ok(timer)
    }

    fn cancel(&self, timer: TimerId) {
        if let Some(task) = self.tasks.lock().unwrap().remove(&timer) {
            task.abort();
            debug!(%timer, "Timer cancelled");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        if let Ok(tasks) = self.tasks.get_mut() {
            for (_, task) in tasks.drain() {
                task.abort();
            }
        }
    }
}

//! Strongly-typed identifiers for host resources

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle for a recurring timer registered with a host scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Handle for a registered document change observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObserverId(u64);

impl ObserverId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}

/// Monotonic allocator for host handle IDs. Never hands out zero.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next_timer(&self) -> TimerId {
        TimerId(self.next.fetch_add(1, Ordering::SeqCst))
    }

    pub fn next_observer(&self) -> ObserverId {
        ObserverId(self.next.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_hands_out_unique_ids() {
        let ids = IdAllocator::new();
        let t1 = ids.next_timer();
        let t2 = ids.next_timer();
        let o1 = ids.next_observer();

        assert_ne!(t1, t2);
        assert_ne!(t1.as_u64(), o1.as_u64());
        assert!(t1.as_u64() > 0);
    }

    #[test]
    fn ids_serialize_deserialize() {
        let timer = TimerId::new(7);
        let json = serde_json::to_string(&timer).unwrap();
        let parsed: TimerId = serde_json::from_str(&json).unwrap();
        assert_eq!(timer, parsed);
        assert_eq!(timer.to_string(), "timer-7");
    }
}

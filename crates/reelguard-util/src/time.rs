//! Time utilities for reelguard
//!
//! Session timing is wall-clock based and persisted as epoch milliseconds,
//! so elapsed time survives restarts of the tracker. All time reads go
//! through the [`Clock`] trait so tests can drive time by hand.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `REELGUARD_MOCK_TIME` environment variable can be set
//! to override the system time seen by [`SystemClock`]. The mocked clock
//! advances at the same rate as real time.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 14:30:00`)

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "REELGUARD_MOCK_TIME";

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// 9999-12-31T23:59:59.999Z
const MAX_PLAUSIBLE_MILLIS: i64 = 253_402_300_799_999;

/// Cached mock time offset (in milliseconds) from the real time when the
/// process started.
static MOCK_TIME_OFFSET: OnceLock<Option<i64>> = OnceLock::new();

fn get_mock_time_offset() -> Option<i64> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match NaiveDateTime::parse_from_str(&mock_time_str, "%Y-%m-%d %H:%M:%S") {
                    Ok(naive_dt) => {
                        if let Some(mock_dt) = Local.from_local_datetime(&naive_dt).single() {
                            let offset = mock_dt.timestamp_millis() - Utc::now().timestamp_millis();
                            tracing::info!(
                                mock_time = %mock_time_str,
                                offset_secs = offset / 1000,
                                "Mock time enabled"
                            );
                            return Some(offset);
                        }
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            "Failed to convert mock time to local timezone"
                        );
                    }
                    Err(_) => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = "%Y-%m-%d %H:%M:%S",
                            "Invalid mock time format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// A wall-clock instant as milliseconds since the Unix epoch.
///
/// This is the unit the persisted session record uses, so it round-trips
/// through storage unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochMillis(i64);

impl EpochMillis {
    /// The epoch itself. Used as "never" for the last-warning timestamp.
    pub const ZERO: EpochMillis = EpochMillis(0);

    pub const fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Convert to local time for display. None if out of chrono's range.
    pub fn to_local(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.0).single()
    }

    /// Fractional minutes from `earlier` to `self`. Negative if `earlier`
    /// is in the future.
    pub fn minutes_since(&self, earlier: EpochMillis) -> f64 {
        self.0.saturating_sub(earlier.0) as f64 / MILLIS_PER_MINUTE
    }

    /// Not before the epoch and not past the end of year 9999
    pub fn is_plausible(&self) -> bool {
        (0..=MAX_PLAUSIBLE_MILLIS).contains(&self.0)
    }

    pub fn saturating_sub(&self, duration: Duration) -> EpochMillis {
        EpochMillis(self.0.saturating_sub(duration_to_millis(duration)))
    }
}

impl std::ops::Add<Duration> for EpochMillis {
    type Output = EpochMillis;

    fn add(self, rhs: Duration) -> Self::Output {
        EpochMillis(self.0.saturating_add(duration_to_millis(rhs)))
    }
}

impl std::ops::Sub<Duration> for EpochMillis {
    type Output = EpochMillis;

    fn sub(self, rhs: Duration) -> Self::Output {
        self.saturating_sub(rhs)
    }
}

impl std::fmt::Display for EpochMillis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_local() {
            Some(dt) => write!(f, "{}", format_datetime_full(&dt)),
            None => write!(f, "{}ms", self.0),
        }
    }
}

fn duration_to_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Format a DateTime for display with full date and time.
pub fn format_datetime_full(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Source of the current wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> EpochMillis;
}

/// The real system clock, respecting mock time settings in debug builds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> EpochMillis {
        let real_now = Utc::now().timestamp_millis();
        match get_mock_time_offset() {
            Some(offset) => EpochMillis(real_now + offset),
            None => EpochMillis(real_now),
        }
    }
}

/// A clock that only moves when told to. For tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: EpochMillis) -> Self {
        Self {
            millis: AtomicI64::new(start.0),
        }
    }

    pub fn set(&self, to: EpochMillis) {
        self.millis.store(to.0, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(duration_to_millis(by), Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    /// Starts at 2025-01-01T00:00:00Z
    fn default() -> Self {
        Self::new(EpochMillis(1_735_689_600_000))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> EpochMillis {
        EpochMillis(self.millis.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_since_is_fractional() {
        let start = EpochMillis::new(1_000_000);
        let later = start + Duration::from_secs(90);
        assert!((later.minutes_since(start) - 1.5).abs() < f64::EPSILON);
        assert!(start.minutes_since(later) < 0.0);
    }

    #[test]
    fn subtraction_saturates() {
        let t = EpochMillis::new(i64::MIN + 5);
        assert_eq!(t - Duration::from_secs(1), EpochMillis::new(i64::MIN));
    }

    #[test]
    fn minutes_since_extremes_do_not_overflow() {
        let now = EpochMillis::new(1_700_000_000_000);
        assert!(now.minutes_since(EpochMillis::new(i64::MIN)) > 0.0);
        assert!(EpochMillis::new(i64::MIN).minutes_since(now) < 0.0);
        assert!(EpochMillis::new(i64::MAX).minutes_since(EpochMillis::new(i64::MIN)).is_finite());
    }

    #[test]
    fn plausible_range() {
        assert!(EpochMillis::ZERO.is_plausible());
        assert!(EpochMillis::new(1_700_000_000_000).is_plausible());
        assert!(!EpochMillis::new(-1).is_plausible());
        assert!(!EpochMillis::new(i64::MAX).is_plausible());
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(EpochMillis::new(0));
        clock.advance(Duration::from_secs(10));
        assert_eq!(clock.now(), EpochMillis::new(10_000));

        clock.set(EpochMillis::new(42));
        assert_eq!(clock.now(), EpochMillis::new(42));
    }

    #[test]
    fn epoch_millis_serializes_as_number() {
        let json = serde_json::to_string(&EpochMillis::new(1234)).unwrap();
        assert_eq!(json, "1234");
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now() > EpochMillis::new(1_577_836_800_000));
    }
}

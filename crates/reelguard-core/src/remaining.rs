//! Remaining-budget calculation

use reelguard_store::TrackingSession;
use reelguard_util::EpochMillis;
use serde::Serialize;

/// Budget left in the current session.
///
/// `Unknown` means there is no session at all and is never treated as
/// exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "minutes", rename_all = "snake_case")]
pub enum Remaining {
    Unknown,
    Minutes(f64),
}

impl Remaining {
    /// True only for a known session with nothing left
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Remaining::Minutes(m) if *m <= 0.0)
    }

    pub fn minutes(&self) -> Option<f64> {
        match self {
            Remaining::Unknown => None,
            Remaining::Minutes(m) => Some(*m),
        }
    }

    pub fn minutes_or_zero(&self) -> f64 {
        self.minutes().unwrap_or(0.0)
    }
}

/// Budget minus elapsed minutes, floored at zero
pub fn remaining(session: Option<&TrackingSession>, now: EpochMillis) -> Remaining {
    match session {
        None => Remaining::Unknown,
        Some(s) => {
            let left = s.total_budget_minutes - s.elapsed_minutes(now);
            Remaining::Minutes(if left > 0.0 { left } else { 0.0 })
        }
    }
}

/// Minimum spacing between warnings: a third of the budget, capped.
pub fn warning_interval_minutes(budget_minutes: f64, cap_minutes: f64) -> f64 {
    cap_minutes.min(budget_minutes / 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const T0: EpochMillis = EpochMillis::new(1_700_000_000_000);

    #[test]
    fn no_session_is_unknown_not_exhausted() {
        let r = remaining(None, T0);
        assert_eq!(r, Remaining::Unknown);
        assert!(!r.is_exhausted());
        assert_eq!(r.minutes_or_zero(), 0.0);
    }

    #[test]
    fn counts_down_from_budget() {
        let session = TrackingSession::new(T0, 5.0);
        assert_eq!(remaining(Some(&session), T0), Remaining::Minutes(5.0));
        assert_eq!(
            remaining(Some(&session), T0 + Duration::from_secs(90)),
            Remaining::Minutes(3.5)
        );
    }

    #[test]
    fn never_negative() {
        let session = TrackingSession::new(T0, 2.0);
        for secs in [120, 121, 180, 86_400] {
            let r = remaining(Some(&session), T0 + Duration::from_secs(secs));
            assert_eq!(r, Remaining::Minutes(0.0));
            assert!(r.is_exhausted());
        }
    }

    #[test]
    fn start_in_the_future_reports_more_than_budget() {
        let session = TrackingSession::new(T0 + Duration::from_secs(60), 2.0);
        assert_eq!(remaining(Some(&session), T0), Remaining::Minutes(3.0));
    }

    #[test]
    fn warning_interval_formula() {
        assert_eq!(warning_interval_minutes(9.0, 3.0), 3.0);
        assert_eq!(warning_interval_minutes(45.0, 3.0), 3.0);
        assert!((warning_interval_minutes(2.0, 3.0) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&Remaining::Minutes(1.5)).unwrap();
        assert_eq!(json, r#"{"kind":"minutes","minutes":1.5}"#);
        let json = serde_json::to_string(&Remaining::Unknown).unwrap();
        assert_eq!(json, r#"{"kind":"unknown"}"#);
    }
}

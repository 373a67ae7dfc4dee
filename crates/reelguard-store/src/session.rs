//! The persisted tracking session

use reelguard_util::EpochMillis;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{KeyValueStorage, StoreResult};

/// One budget period in the monitored section.
///
/// Serialized as `{ "startTime": ms, "totalTime": minutes, "lastOverlayShown": ms }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingSession {
    /// When the current budget period began
    #[serde(rename = "startTime")]
    pub start_time: EpochMillis,

    /// Configured session length in minutes
    #[serde(rename = "totalTime")]
    pub total_budget_minutes: f64,

    /// Last time an overlay was acknowledged; zero if never
    #[serde(rename = "lastOverlayShown")]
    pub last_warning_time: EpochMillis,
}

impl TrackingSession {
    /// A fresh session starting at `now` with no warning shown yet
    pub fn new(now: EpochMillis, budget_minutes: f64) -> Self {
        Self {
            start_time: now,
            total_budget_minutes: budget_minutes,
            last_warning_time: EpochMillis::ZERO,
        }
    }

    /// Minutes since the session started
    pub fn elapsed_minutes(&self, now: EpochMillis) -> f64 {
        now.minutes_since(self.start_time)
    }

    /// Minutes since the last acknowledged overlay
    pub fn minutes_since_warning(&self, now: EpochMillis) -> f64 {
        now.minutes_since(self.last_warning_time)
    }

    fn is_well_formed(&self) -> bool {
        self.total_budget_minutes.is_finite()
            && self.total_budget_minutes >= 0.0
            && self.start_time.is_plausible()
            && self.last_warning_time.is_plausible()
    }
}

/// Reads and writes the single tracking session under a fixed key.
///
/// Storage is the source of truth for session timing; nothing is cached here.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the current session.
    ///
    /// Missing, unreadable or malformed records all come back as `None`.
    pub fn load(&self) -> Option<TrackingSession> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read tracking session");
                return None;
            }
        };

        match serde_json::from_str::<TrackingSession>(&raw) {
            Ok(session) if session.is_well_formed() => Some(session),
            Ok(_) => {
                debug!(key = %self.key, "Ignoring tracking session with out-of-range values");
                None
            }
            Err(e) => {
                debug!(key = %self.key, error = %e, "Ignoring malformed tracking session");
                None
            }
        }
    }

    /// Overwrite the persisted session
    pub fn save(&self, session: &TrackingSession) -> StoreResult<()> {
        let json = serde_json::to_string(session)?;
        self.storage.set(&self.key, &json)?;
        debug!(
            key = %self.key,
            start_time = session.start_time.as_millis(),
            budget_minutes = session.total_budget_minutes,
            "Tracking session saved"
        );
        Ok(())
    }

    /// Remove the persisted session
    pub fn clear(&self) -> StoreResult<()> {
        self.storage.remove(&self.key)?;
        debug!(key = %self.key, "Tracking session cleared");
        Ok(())
    }

    /// Stamp the last-warning time on the existing session.
    ///
    /// Start time and budget are left untouched. Returns the updated session,
    /// or `None` if there was no session to update.
    pub fn record_acknowledgement(&self, now: EpochMillis) -> StoreResult<Option<TrackingSession>> {
        let Some(mut session) = self.load() else {
            return Ok(None);
        };
        session.last_warning_time = now;
        self.save(&session)?;
        Ok(Some(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;

    fn store() -> (Arc<MemoryStorage>, SessionStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone(), "reelsTimeTracker");
        (storage, store)
    }

    #[test]
    fn wire_shape_uses_record_field_names() {
        let session = TrackingSession::new(EpochMillis::new(1_700_000_000_000), 5.0);
        let json: serde_json::Value = serde_json::to_value(session).unwrap();

        assert_eq!(json["startTime"], 1_700_000_000_000i64);
        assert_eq!(json["totalTime"], 5.0);
        assert_eq!(json["lastOverlayShown"], 0);
    }

    #[test]
    fn reads_records_written_by_other_writers() {
        let (storage, store) = store();
        storage
            .set(
                "reelsTimeTracker",
                r#"{"startTime":1700000000000,"totalTime":2,"lastOverlayShown":0}"#,
            )
            .unwrap();

        let session = store.load().unwrap();
        assert_eq!(session.start_time, EpochMillis::new(1_700_000_000_000));
        assert_eq!(session.total_budget_minutes, 2.0);
    }

    #[test]
    fn malformed_records_are_absent() {
        let (storage, store) = store();

        for raw in [
            "not json",
            "{}",
            r#"{"lastOverlayShown":1700000000000}"#,
            r#"{"startTime":"yesterday","totalTime":2,"lastOverlayShown":0}"#,
            r#"{"startTime":1,"totalTime":-4,"lastOverlayShown":0}"#,
        ] {
            storage.set("reelsTimeTracker", raw).unwrap();
            assert!(store.load().is_none(), "expected {raw} to be treated as absent");
        }
    }

    #[test]
    fn out_of_range_timestamps_are_absent() {
        let (storage, store) = store();

        for raw in [
            r#"{"startTime":-9223372036854775808,"totalTime":2,"lastOverlayShown":0}"#,
            r#"{"startTime":9223372036854775807,"totalTime":2,"lastOverlayShown":0}"#,
            r#"{"startTime":1700000000000,"totalTime":2,"lastOverlayShown":-1}"#,
        ] {
            storage.set("reelsTimeTracker", raw).unwrap();
            assert!(store.load().is_none(), "expected {raw} to be treated as absent");
        }
    }

    #[test]
    fn save_load_clear() {
        let (_storage, store) = store();
        assert!(store.load().is_none());

        let session = TrackingSession::new(EpochMillis::new(1000), 9.0);
        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));

        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn acknowledgement_only_moves_last_warning() {
        let (_storage, store) = store();
        let session = TrackingSession::new(EpochMillis::new(1000), 9.0);
        store.save(&session).unwrap();

        let updated = store
            .record_acknowledgement(EpochMillis::new(61_000))
            .unwrap()
            .unwrap();
        assert_eq!(updated.last_warning_time, EpochMillis::new(61_000));
        assert_eq!(updated.start_time, session.start_time);
        assert_eq!(updated.total_budget_minutes, session.total_budget_minutes);
        assert_eq!(store.load(), Some(updated));
    }

    #[test]
    fn acknowledgement_without_session_is_noop() {
        let (storage, store) = store();
        assert!(store.record_acknowledgement(EpochMillis::new(5)).unwrap().is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn minute_helpers() {
        let session = TrackingSession {
            start_time: EpochMillis::new(0),
            total_budget_minutes: 10.0,
            last_warning_time: EpochMillis::new(60_000),
        };
        let now = EpochMillis::new(180_000);
        assert_eq!(session.elapsed_minutes(now), 3.0);
        assert_eq!(session.minutes_since_warning(now), 2.0);
    }
}

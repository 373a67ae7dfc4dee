//! Validated policy structures

use crate::schema::{RawConfig, RawOverlayConfig, RawServiceConfig, RawTrackerConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Budget used when neither config nor caller supplies one
pub const DEFAULT_BUDGET_MINUTES: f64 = 2.0;

/// Enforcement check cadence
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Warnings are never spaced further apart than this
pub const DEFAULT_WARNING_INTERVAL_CAP_MINUTES: f64 = 3.0;

pub const DEFAULT_SECTION_MARKERS: [&str; 3] = ["/reels", "/reel", "/shorts"];

pub const DEFAULT_HOME_LOCATION: &str = "/";

pub const DEFAULT_STORAGE_KEY: &str = "reelsTimeTracker";

pub const DEFAULT_OVERLAY_ELEMENT_ID: &str = "reels-time-overlay";

pub const DEFAULT_START_LOCATION: &str = "https://www.instagram.com/";

/// Validated policy ready for use by the tracker
#[derive(Debug, Clone, Default)]
pub struct Policy {
    pub service: ServiceConfig,
    pub tracker: TrackerPolicy,
    pub overlay: OverlayCopy,
}

impl Policy {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            service: ServiceConfig::from_raw(raw.service),
            tracker: TrackerPolicy::from_raw(raw.tracker),
            overlay: OverlayCopy::from_raw(raw.overlay),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    pub start_location: String,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        Self {
            data_dir: raw
                .data_dir
                .unwrap_or_else(reelguard_util::default_data_dir),
            start_location: raw
                .start_location
                .unwrap_or_else(|| DEFAULT_START_LOCATION.to_string()),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_raw(RawServiceConfig::default())
    }
}

/// Time budget and enforcement settings
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerPolicy {
    /// Session budget in minutes
    pub budget_minutes: f64,
    pub poll_interval: Duration,
    pub warning_interval_cap_minutes: f64,
    pub section_markers: Vec<String>,
    pub home_location: String,
    pub storage_key: String,
}

impl TrackerPolicy {
    fn from_raw(raw: RawTrackerConfig) -> Self {
        Self {
            budget_minutes: raw.budget_minutes.unwrap_or(DEFAULT_BUDGET_MINUTES),
            poll_interval: raw
                .poll_interval_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            warning_interval_cap_minutes: raw
                .warning_interval_cap_minutes
                .unwrap_or(DEFAULT_WARNING_INTERVAL_CAP_MINUTES),
            section_markers: raw.section_markers.unwrap_or_else(default_section_markers),
            home_location: raw
                .home_location
                .unwrap_or_else(|| DEFAULT_HOME_LOCATION.to_string()),
            storage_key: raw
                .storage_key
                .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string()),
        }
    }

    /// Same policy with a caller-supplied budget. Non-positive or non-finite
    /// budgets are ignored.
    pub fn with_budget(mut self, budget_minutes: Option<f64>) -> Self {
        match budget_minutes {
            Some(b) if b.is_finite() && b > 0.0 => self.budget_minutes = b,
            Some(b) => tracing::warn!(budget_minutes = b, "Ignoring invalid budget override"),
            None => {}
        }
        self
    }
}

impl Default for TrackerPolicy {
    fn default() -> Self {
        Self::from_raw(RawTrackerConfig::default())
    }
}

fn default_section_markers() -> Vec<String> {
    DEFAULT_SECTION_MARKERS.iter().map(|m| m.to_string()).collect()
}

/// Text and identity of the enforcement overlay
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayCopy {
    pub element_id: String,
    pub headline: String,
    pub finished_message: String,
    pub unit_label: String,
    pub acknowledge_label: String,
}

impl OverlayCopy {
    fn from_raw(raw: RawOverlayConfig) -> Self {
        Self {
            element_id: raw
                .element_id
                .unwrap_or_else(|| DEFAULT_OVERLAY_ELEMENT_ID.to_string()),
            headline: raw
                .headline
                .unwrap_or_else(|| "Time to take control of your day.".to_string()),
            finished_message: raw
                .finished_message
                .unwrap_or_else(|| "Your time is up for now.".to_string()),
            unit_label: raw.unit_label.unwrap_or_else(|| "mins left".to_string()),
            acknowledge_label: raw.acknowledge_label.unwrap_or_else(|| "Close".to_string()),
        }
    }
}

impl Default for OverlayCopy {
    fn default() -> Self {
        Self::from_raw(RawOverlayConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let policy = TrackerPolicy::default();
        assert_eq!(policy.budget_minutes, 2.0);
        assert_eq!(policy.poll_interval, Duration::from_secs(10));
        assert_eq!(policy.warning_interval_cap_minutes, 3.0);
        assert_eq!(policy.section_markers, vec!["/reels", "/reel", "/shorts"]);
        assert_eq!(policy.home_location, "/");
        assert_eq!(policy.storage_key, "reelsTimeTracker");
    }

    #[test]
    fn budget_override() {
        let policy = TrackerPolicy::default().with_budget(Some(45.0));
        assert_eq!(policy.budget_minutes, 45.0);

        let policy = TrackerPolicy::default().with_budget(Some(-1.0));
        assert_eq!(policy.budget_minutes, DEFAULT_BUDGET_MINUTES);

        let policy = TrackerPolicy::default().with_budget(None);
        assert_eq!(policy.budget_minutes, DEFAULT_BUDGET_MINUTES);
    }

    #[test]
    fn overlay_defaults() {
        let copy = OverlayCopy::default();
        assert_eq!(copy.element_id, "reels-time-overlay");
        assert_eq!(copy.acknowledge_label, "Close");
    }
}

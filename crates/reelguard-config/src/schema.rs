//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Service-level settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Time budget and enforcement settings
    #[serde(default)]
    pub tracker: RawTrackerConfig,

    /// Overlay copy and element identity
    #[serde(default)]
    pub overlay: RawOverlayConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Data directory for the session database
    pub data_dir: Option<PathBuf>,

    /// Location the console host opens at
    pub start_location: Option<String>,
}

/// Tracker settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTrackerConfig {
    /// Session budget in minutes (fractions allowed)
    pub budget_minutes: Option<f64>,

    /// How often the enforcement check runs
    pub poll_interval_seconds: Option<u64>,

    /// Upper bound on spacing between warning overlays, in minutes
    pub warning_interval_cap_minutes: Option<f64>,

    /// Substrings of the location that mark the monitored section
    pub section_markers: Option<Vec<String>>,

    /// Where a finished session sends the user
    pub home_location: Option<String>,

    /// Storage key for the persisted session record
    pub storage_key: Option<String>,
}

/// Overlay settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawOverlayConfig {
    pub element_id: Option<String>,
    pub headline: Option<String>,
    pub finished_message: Option<String>,
    pub unit_label: Option<String>,
    pub acknowledge_label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tracker_section() {
        let toml_str = r#"
            config_version = 1

            [tracker]
            budget_minutes = 2.5
            section_markers = ["/reels", "/shorts"]
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.tracker.budget_minutes, Some(2.5));
        assert_eq!(config.tracker.section_markers.as_ref().unwrap().len(), 2);
        assert!(config.overlay.headline.is_none());
    }

    #[test]
    fn parse_service_section() {
        let toml_str = r#"
            config_version = 1

            [service]
            data_dir = "/var/lib/reelguard"
            start_location = "https://www.instagram.com/reels/"
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.service.data_dir,
            Some(PathBuf::from("/var/lib/reelguard"))
        );
        assert!(config.service.start_location.unwrap().contains("/reels"));
    }
}

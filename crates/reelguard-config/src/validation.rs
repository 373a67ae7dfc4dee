//! Configuration validation

use crate::schema::{RawConfig, RawOverlayConfig, RawTrackerConfig};
use crate::{DEFAULT_HOME_LOCATION, DEFAULT_SECTION_MARKERS};
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("tracker.{field}: {message}")]
    TrackerError { field: &'static str, message: String },

    #[error("overlay.{field}: {message}")]
    OverlayError { field: &'static str, message: String },

    #[error("Duplicate section marker: {0}")]
    DuplicateMarker(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = validate_tracker(&config.tracker);
    errors.extend(validate_overlay(&config.overlay));
    errors
}

fn validate_tracker(tracker: &RawTrackerConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(budget) = tracker.budget_minutes
        && !(budget.is_finite() && budget > 0.0)
    {
        errors.push(ValidationError::TrackerError {
            field: "budget_minutes",
            message: format!("must be a positive number of minutes, got {}", budget),
        });
    }

    if tracker.poll_interval_seconds == Some(0) {
        errors.push(ValidationError::TrackerError {
            field: "poll_interval_seconds",
            message: "must be at least 1".into(),
        });
    }

    if let Some(cap) = tracker.warning_interval_cap_minutes
        && !(cap.is_finite() && cap > 0.0)
    {
        errors.push(ValidationError::TrackerError {
            field: "warning_interval_cap_minutes",
            message: format!("must be a positive number of minutes, got {}", cap),
        });
    }

    if let Some(markers) = &tracker.section_markers {
        if markers.is_empty() {
            errors.push(ValidationError::TrackerError {
                field: "section_markers",
                message: "at least one marker is required".into(),
            });
        }

        let mut seen = HashSet::new();
        for marker in markers {
            if marker.trim().is_empty() {
                errors.push(ValidationError::TrackerError {
                    field: "section_markers",
                    message: "markers cannot be empty".into(),
                });
            } else if !seen.insert(marker.as_str()) {
                errors.push(ValidationError::DuplicateMarker(marker.clone()));
            }
        }
    }

    let home = tracker
        .home_location
        .as_deref()
        .unwrap_or(DEFAULT_HOME_LOCATION);
    if home.trim().is_empty() {
        errors.push(ValidationError::TrackerError {
            field: "home_location",
            message: "cannot be empty".into(),
        });
    } else {
        // The hard stop redirects home, so home must be outside the section
        let markers: Vec<&str> = match &tracker.section_markers {
            Some(markers) => markers.iter().map(String::as_str).collect(),
            None => DEFAULT_SECTION_MARKERS.to_vec(),
        };
        if let Some(marker) = markers
            .iter()
            .find(|m| !m.trim().is_empty() && home.contains(**m))
        {
            errors.push(ValidationError::TrackerError {
                field: "home_location",
                message: format!("'{}' is inside the monitored section (matches '{}')", home, marker),
            });
        }
    }

    if let Some(key) = &tracker.storage_key
        && key.trim().is_empty()
    {
        errors.push(ValidationError::TrackerError {
            field: "storage_key",
            message: "cannot be empty".into(),
        });
    }

    errors
}

fn validate_overlay(overlay: &RawOverlayConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(id) = &overlay.element_id
        && (id.is_empty() || id.chars().any(char::is_whitespace))
    {
        errors.push(ValidationError::OverlayError {
            field: "element_id",
            message: format!("'{}' is not a usable element id", id),
        });
    }

    errors
}

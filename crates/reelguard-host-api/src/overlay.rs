//! Overlay view model

use serde::{Deserialize, Serialize};

/// What the overlay is telling the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
    /// Time is running; dismissing returns to the feed
    Warning,
    /// Budget exhausted; dismissing leaves the section
    Finished,
}

/// Everything a surface needs to draw the overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayView {
    pub element_id: String,
    pub mode: OverlayMode,
    /// Whole minutes left, already rounded
    pub remaining_minutes: i64,
    pub headline: String,
    /// Secondary line: the finished message, or empty while warning
    pub message: String,
    pub unit_label: String,
    pub acknowledge_label: String,
}

impl OverlayView {
    pub fn is_finished(&self) -> bool {
        self.mode == OverlayMode::Finished
    }

    /// Plain-text rendering, used by text surfaces and logs
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            self.headline.clone(),
            format!("{} {}", self.remaining_minutes, self.unit_label),
        ];
        if !self.message.is_empty() {
            lines.push(self.message.clone());
        }
        lines.push(format!("[{}]", self.acknowledge_label));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(mode: OverlayMode, message: &str) -> OverlayView {
        OverlayView {
            element_id: "reels-time-overlay".into(),
            mode,
            remaining_minutes: 4,
            headline: "Time to take control of your day.".into(),
            message: message.into(),
            unit_label: "mins left".into(),
            acknowledge_label: "Close".into(),
        }
    }

    #[test]
    fn text_rendering() {
        let text = view(OverlayMode::Warning, "").to_text();
        assert_eq!(text, "Time to take control of your day.\n4 mins left\n[Close]");

        let text = view(OverlayMode::Finished, "Your time is up for now.").to_text();
        assert!(text.contains("Your time is up for now."));
    }

    #[test]
    fn mode_serializes_snake_case() {
        let json = serde_json::to_string(&OverlayMode::Finished).unwrap();
        assert_eq!(json, "\"finished\"");
    }
}

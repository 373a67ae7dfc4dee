//! Monitored-section classification

/// Decides whether a location is inside the monitored section.
///
/// A location is inside when it contains any of the configured markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionClassifier {
    markers: Vec<String>,
}

impl SectionClassifier {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(Into::into)
                .filter(|m: &String| !m.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, location: &str) -> bool {
        self.markers.iter().any(|m| location.contains(m.as_str()))
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> SectionClassifier {
        SectionClassifier::new(["/reels", "/reel", "/shorts"])
    }

    #[test]
    fn matches_any_marker() {
        let c = classifier();
        assert!(c.contains("https://www.instagram.com/reels/"));
        assert!(c.contains("https://www.instagram.com/reel/C1xyz/"));
        assert!(c.contains("https://www.youtube.com/shorts/abc"));
    }

    #[test]
    fn rejects_other_locations() {
        let c = classifier();
        assert!(!c.contains("https://www.instagram.com/"));
        assert!(!c.contains("https://www.instagram.com/direct/inbox/"));
        assert!(!c.contains(""));
    }

    #[test]
    fn empty_markers_never_match() {
        let c = SectionClassifier::new(["", "/reels"]);
        assert_eq!(c.markers().len(), 1);
        assert!(!c.contains("https://www.instagram.com/"));
    }
}

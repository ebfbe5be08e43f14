use serde::{Deserialize, Serialize};

/// Per-frame tracking state of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackState {
    /// Not matched yet this frame; every object starts a frame here
    #[default]
    NotTracked,
    /// Matched by primary detection on the real frame
    Tracked,
    /// Matched through depth-guided occlusion recovery
    Occluded,
}

impl TrackState {
    /// Whether the object was matched in the current frame.
    #[inline]
    pub fn is_matched(self) -> bool {
        self != TrackState::NotTracked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matched_states() {
        assert!(!TrackState::default().is_matched());
        assert!(TrackState::Tracked.is_matched());
        assert!(TrackState::Occluded.is_matched());
    }
}

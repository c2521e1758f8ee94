//! Landmark and frame types
//!
//! A frame is a fixed-size ordered set of 33 body landmarks with normalized
//! positions and a per-landmark visibility confidence. Coordinates are
//! normalized to the capture frame and may slightly exceed [0, 1] when the
//! upstream model extrapolates off-screen points.
//!
//! The y axis grows *downward*: a smaller y means higher on screen. Every
//! vertical comparison in the engine depends on this convention.

use serde::{Deserialize, Serialize};

/// Number of landmarks in a complete body frame
pub const LANDMARK_COUNT: usize = 33;

// Semantic landmark indices (33-point body topology)
pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;
pub const LEFT_FOOT_INDEX: usize = 31;
pub const RIGHT_FOOT_INDEX: usize = 32;

/// Torso and leg landmarks used for the whole-body visibility preflight.
/// If too few of these are visible the subject is framed badly and no
/// criterion is worth scoring.
pub const KEY_LANDMARKS: [usize; 12] = [
    LEFT_SHOULDER,
    RIGHT_SHOULDER,
    LEFT_ELBOW,
    RIGHT_ELBOW,
    LEFT_WRIST,
    RIGHT_WRIST,
    LEFT_HIP,
    RIGHT_HIP,
    LEFT_KNEE,
    RIGHT_KNEE,
    LEFT_ANKLE,
    RIGHT_ANKLE,
];

/// One tracked body keypoint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized horizontal position, typically [0, 1]
    pub x: f32,
    /// Normalized vertical position, typically [0, 1]; grows downward
    pub y: f32,
    /// Relative depth (unused by planar criteria)
    pub z: f32,
    /// Detection confidence in [0, 1]
    pub visibility: f32,
}

impl Landmark {
    /// Build a landmark from a wire tuple `[x, y, z, visibility]`
    pub fn from_tuple(t: [f32; 4]) -> Self {
        Self {
            x: t[0],
            y: t[1],
            z: t[2],
            visibility: t[3],
        }
    }

    /// Serialize back to the wire tuple shape
    pub fn to_tuple(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.visibility]
    }
}

/// The complete landmark set for one capture instant
#[derive(Debug, Clone)]
pub struct Frame {
    /// Ordered landmark set; complete frames hold [`LANDMARK_COUNT`] entries
    pub landmarks: Vec<Landmark>,
    /// Capture timestamp in milliseconds on the session's monotonic clock
    pub timestamp_ms: u64,
}

impl Frame {
    /// Create a frame from landmarks and a timestamp
    pub fn new(landmarks: Vec<Landmark>, timestamp_ms: u64) -> Self {
        Self {
            landmarks,
            timestamp_ms,
        }
    }

    /// Whether the frame carries the full 33-landmark set.
    /// Incomplete frames indicate lost tracking and bypass the pipeline.
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() == LANDMARK_COUNT
    }
}

/// A frame after temporal smoothing.
///
/// Same shape as [`Frame`]; the smoother guarantees a complete landmark set,
/// so evaluators index it directly.
#[derive(Debug, Clone)]
pub struct SmoothedFrame {
    pub landmarks: Vec<Landmark>,
    pub timestamp_ms: u64,
}

impl SmoothedFrame {
    /// Landmark at a semantic index
    pub fn landmark(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }

    /// Landmarks as wire tuples for the output message
    pub fn to_tuples(&self) -> Vec<[f32; 4]> {
        self.landmarks.iter().map(|lm| lm.to_tuple()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_tuple_roundtrip() {
        let lm = Landmark::from_tuple([0.5, 0.25, -0.1, 0.9]);
        assert_eq!(lm.x, 0.5);
        assert_eq!(lm.y, 0.25);
        assert_eq!(lm.z, -0.1);
        assert_eq!(lm.visibility, 0.9);
        assert_eq!(lm.to_tuple(), [0.5, 0.25, -0.1, 0.9]);
    }

    #[test]
    fn test_frame_completeness() {
        let full = Frame::new(vec![Landmark::default(); LANDMARK_COUNT], 0);
        assert!(full.is_complete());

        let partial = Frame::new(vec![Landmark::default(); 20], 0);
        assert!(!partial.is_complete());

        let empty = Frame::new(vec![], 0);
        assert!(!empty.is_complete());
    }

    #[test]
    fn test_key_landmarks_are_torso_and_legs() {
        assert_eq!(KEY_LANDMARKS.len(), 12);
        for idx in KEY_LANDMARKS {
            assert!(idx < LANDMARK_COUNT);
            assert_ne!(idx, NOSE);
        }
    }

    #[test]
    fn test_smoothed_frame_tuples() {
        let frame = SmoothedFrame {
            landmarks: vec![Landmark::from_tuple([0.1, 0.2, 0.3, 0.4]); LANDMARK_COUNT],
            timestamp_ms: 42,
        };
        let tuples = frame.to_tuples();
        assert_eq!(tuples.len(), LANDMARK_COUNT);
        assert_eq!(tuples[0], [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(frame.landmark(NOSE).y, 0.2);
    }
}

//! Landmark data model
//!
//! Defines the per-frame body-landmark set consumed from the upstream
//! pose-estimation collaborator, together with the semantic indices of the
//! 33-point body topology.

pub mod types;

pub use types::{
    Frame, Landmark, SmoothedFrame, KEY_LANDMARKS, LANDMARK_COUNT, LEFT_ANKLE, LEFT_ELBOW,
    LEFT_FOOT_INDEX, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST, NOSE, RIGHT_ANKLE,
    RIGHT_ELBOW, RIGHT_FOOT_INDEX, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};

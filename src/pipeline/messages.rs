//! Wire messages for the frame pipeline
//!
//! One input and one output message per frame, both JSON. Absent optional
//! fields are omitted from the serialized output rather than sent as null.

use serde::{Deserialize, Serialize};

use crate::landmark::{Frame, Landmark};
use crate::scoring::{ColorBand, PoseEvaluation};
use crate::session::SessionEvent;

/// One incoming camera frame.
///
/// `landmarks` is `None` when the detector found no person; each present
/// landmark is `[x, y, z, visibility]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameInput {
    pub exercise_id: String,
    #[serde(default)]
    pub landmarks: Option<Vec<[f32; 4]>>,
}

impl FrameInput {
    /// Convert to a domain frame, stamped with the session clock
    pub fn to_frame(&self, timestamp_ms: u64) -> Option<Frame> {
        let landmarks = self.landmarks.as_ref()?;
        Some(Frame::new(
            landmarks.iter().map(|&t| Landmark::from_tuple(t)).collect(),
            timestamp_ms,
        ))
    }
}

/// Countdown snapshot attached to every output
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountdownStatus {
    pub holding: bool,
    pub remaining_secs: u32,
}

/// Result of one frame submission.
///
/// `success: true` carries the evaluation fields; `success: false` carries
/// a `message` explaining why no evaluation was produced. The countdown
/// status is present either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameOutput {
    pub success: bool,
    /// Smoothed landmarks, mirroring the input tuple layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<Vec<[f32; 4]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub countdown: CountdownStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<SessionEvent>,
}

impl FrameOutput {
    pub fn evaluated(
        landmarks: Vec<[f32; 4]>,
        evaluation: &PoseEvaluation,
        countdown: CountdownStatus,
        event: Option<SessionEvent>,
    ) -> Self {
        Self {
            success: true,
            landmarks: Some(landmarks),
            accuracy: Some(evaluation.accuracy),
            color: Some(evaluation.color),
            feedback: Some(evaluation.feedback.clone()),
            message: None,
            countdown,
            event,
        }
    }

    pub fn failed(
        message: impl Into<String>,
        countdown: CountdownStatus,
        event: Option<SessionEvent>,
    ) -> Self {
        Self {
            success: false,
            landmarks: None,
            accuracy: None,
            color: None,
            feedback: None,
            message: Some(message.into()),
            countdown,
            event,
        }
    }
}

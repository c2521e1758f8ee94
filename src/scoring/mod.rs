//! Criterion scores and accuracy aggregation
//!
//! Every exercise evaluator produces a list of [`CriterionScore`]s; the
//! aggregator sums them (each pre-capped at its documented maximum), clamps
//! the total to [0, 100] and maps it onto a fixed color band. Bands are
//! contiguous, non-overlapping and inclusive at their lower bound.

use serde::{Deserialize, Serialize};

/// Default feedback when no criterion produced a message
pub const NEUTRAL_FEEDBACK: &str = "Position yourself";

/// Separator between per-criterion feedback messages
const FEEDBACK_SEPARATOR: &str = " | ";

/// Qualitative color band derived from total accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBand {
    Red,
    Yellow,
    Green,
}

impl ColorBand {
    /// Map an accuracy value to its band: [0, 50) red, [50, 70) yellow,
    /// [70, 100] green.
    pub fn from_accuracy(accuracy: f32) -> Self {
        if accuracy >= 70.0 {
            ColorBand::Green
        } else if accuracy >= 50.0 {
            ColorBand::Yellow
        } else {
            ColorBand::Red
        }
    }
}

/// Score for one independently evaluated pose aspect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    /// Criterion name, e.g. "leg-height"
    pub name: String,
    /// Points awarded, never above `max_points` after aggregation
    pub points: u32,
    /// Documented maximum for this criterion
    pub max_points: u32,
    /// Coaching message, if the criterion has one for the matched band
    pub feedback: Option<String>,
}

impl CriterionScore {
    pub fn new(
        name: impl Into<String>,
        points: u32,
        max_points: u32,
        feedback: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            points,
            max_points,
            feedback,
        }
    }
}

/// Result of evaluating one smoothed frame against an exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseEvaluation {
    /// Per-criterion scores in evaluation order
    pub criteria: Vec<CriterionScore>,
    /// Total accuracy, clamped to [0, 100]
    pub accuracy: f32,
    /// Color band for `accuracy`
    pub color: ColorBand,
    /// Concatenated per-criterion feedback
    pub feedback: String,
}

/// Sum criterion points into a clamped accuracy, color band and feedback line
pub fn aggregate(criteria: Vec<CriterionScore>) -> PoseEvaluation {
    let total: u32 = criteria.iter().map(|c| c.points.min(c.max_points)).sum();
    let accuracy = (total as f32).clamp(0.0, 100.0);
    let color = ColorBand::from_accuracy(accuracy);

    let messages: Vec<&str> = criteria
        .iter()
        .filter_map(|c| c.feedback.as_deref())
        .collect();
    let feedback = if messages.is_empty() {
        NEUTRAL_FEEDBACK.to_string()
    } else {
        messages.join(FEEDBACK_SEPARATOR)
    };

    PoseEvaluation {
        criteria,
        accuracy,
        color,
        feedback,
    }
}

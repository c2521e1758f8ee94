//! Generic criterion pipeline
//!
//! Most exercises are a list of independent criteria, each a discrete step
//! function of one measured quantity. The step tables are deliberate: a
//! continuous formula would flicker near band boundaries, and the documented
//! boundaries are part of the observable contract. Exercises describe their
//! criteria as data ([`Criterion`]) instead of bespoke evaluator code.

use serde::{Deserialize, Serialize};

use crate::geometry;
use crate::landmark::{
    SmoothedFrame, LEFT_ANKLE, LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST,
    RIGHT_ANKLE, RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};
use crate::scoring::{self, CriterionScore, PoseEvaluation};

/// Visibility floor for landmarks a measure depends on
const MEASURE_VISIBILITY_FLOOR: f32 = 0.4;

/// Elbow extension (degrees) required before arm levelness is meaningful
const ARM_EXTENSION_FLOOR_DEG: f32 = 160.0;

/// A measured quantity a criterion steps over.
///
/// Measures sample the smoothed frame and may refuse to produce a value
/// (`None`) when their internal gate is unmet; a refused sample scores the
/// criterion's miss band, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Measure {
    /// Smaller of the two hip-knee-ankle angles: the bent (front) leg
    NarrowerKneeAngle,
    /// Larger of the two hip-knee-ankle angles: the straight (back) leg
    WiderKneeAngle,
    /// Smaller of the two shoulder-elbow-wrist angles
    ElbowExtension,
    /// |wrist midpoint y - shoulder midpoint y|, gated on both arms being
    /// extended (elbow angles at or above 160 degrees)
    ArmLevelness,
    /// Shoulder midpoint y minus hip midpoint y; negative means the
    /// shoulders sit above the hips (y grows downward)
    TorsoLean,
    /// Largest vertical misalignment along shoulder-hip-ankle midpoints
    BodyLineDeviation,
    /// Shoulder midpoint y, for coarse framing checks
    ShoulderHeight,
}

impl Measure {
    /// Landmarks that must clear the visibility floor before sampling
    fn required_landmarks(&self) -> &'static [usize] {
        match self {
            Measure::NarrowerKneeAngle | Measure::WiderKneeAngle => &[
                LEFT_HIP, RIGHT_HIP, LEFT_KNEE, RIGHT_KNEE, LEFT_ANKLE, RIGHT_ANKLE,
            ],
            Measure::ElbowExtension | Measure::ArmLevelness => &[
                LEFT_SHOULDER,
                RIGHT_SHOULDER,
                LEFT_ELBOW,
                RIGHT_ELBOW,
                LEFT_WRIST,
                RIGHT_WRIST,
            ],
            Measure::TorsoLean => &[LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_HIP, RIGHT_HIP],
            Measure::BodyLineDeviation => &[
                LEFT_SHOULDER,
                RIGHT_SHOULDER,
                LEFT_HIP,
                RIGHT_HIP,
                LEFT_ANKLE,
                RIGHT_ANKLE,
            ],
            Measure::ShoulderHeight => &[LEFT_SHOULDER, RIGHT_SHOULDER],
        }
    }

    fn all_required_visible(&self, frame: &SmoothedFrame) -> bool {
        self.required_landmarks()
            .iter()
            .all(|&idx| geometry::visible(frame.landmark(idx), MEASURE_VISIBILITY_FLOOR))
    }

    /// Sample the measure from a smoothed frame
    fn sample(&self, frame: &SmoothedFrame) -> Option<f32> {
        let left_leg = || {
            geometry::angle(
                frame.landmark(LEFT_HIP),
                frame.landmark(LEFT_KNEE),
                frame.landmark(LEFT_ANKLE),
            )
        };
        let right_leg = || {
            geometry::angle(
                frame.landmark(RIGHT_HIP),
                frame.landmark(RIGHT_KNEE),
                frame.landmark(RIGHT_ANKLE),
            )
        };
        let left_arm = || {
            geometry::angle(
                frame.landmark(LEFT_SHOULDER),
                frame.landmark(LEFT_ELBOW),
                frame.landmark(LEFT_WRIST),
            )
        };
        let right_arm = || {
            geometry::angle(
                frame.landmark(RIGHT_SHOULDER),
                frame.landmark(RIGHT_ELBOW),
                frame.landmark(RIGHT_WRIST),
            )
        };
        let shoulder_mid_y =
            || (frame.landmark(LEFT_SHOULDER).y + frame.landmark(RIGHT_SHOULDER).y) / 2.0;
        let hip_mid_y = || (frame.landmark(LEFT_HIP).y + frame.landmark(RIGHT_HIP).y) / 2.0;
        let ankle_mid_y = || (frame.landmark(LEFT_ANKLE).y + frame.landmark(RIGHT_ANKLE).y) / 2.0;

        match self {
            Measure::NarrowerKneeAngle => Some(left_leg().min(right_leg())),
            Measure::WiderKneeAngle => Some(left_leg().max(right_leg())),
            Measure::ElbowExtension => Some(left_arm().min(right_arm())),
            Measure::ArmLevelness => {
                if left_arm().min(right_arm()) < ARM_EXTENSION_FLOOR_DEG {
                    return None;
                }
                let wrist_mid_y =
                    (frame.landmark(LEFT_WRIST).y + frame.landmark(RIGHT_WRIST).y) / 2.0;
                Some((wrist_mid_y - shoulder_mid_y()).abs())
            }
            Measure::TorsoLean => Some(shoulder_mid_y() - hip_mid_y()),
            Measure::BodyLineDeviation => {
                let shoulder_hip = (shoulder_mid_y() - hip_mid_y()).abs();
                let hip_ankle = (hip_mid_y() - ankle_mid_y()).abs();
                Some(shoulder_hip.max(hip_ankle))
            }
            Measure::ShoulderHeight => Some(shoulder_mid_y()),
        }
    }
}

/// One step of a criterion's score table. A band matches when the sampled
/// value is within `[min, max]`; bounds are inclusive unless `exclusive` is
/// set, and an omitted bound is open. Bands are tried in declaration order;
/// the first match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f32>,
    /// Compare both bounds strictly, so the band is the open interval
    /// `(min, max)`. A value landing exactly on a bound does not match.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exclusive: bool,
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl ScoreBand {
    fn matches(&self, value: f32) -> bool {
        let above = self.min.map_or(true, |min| {
            if self.exclusive {
                value > min
            } else {
                value >= min
            }
        });
        let below = self.max.map_or(true, |max| {
            if self.exclusive {
                value < max
            } else {
                value <= max
            }
        });
        above && below
    }
}

/// One independently scored pose aspect, described as data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub max_points: u32,
    pub measure: Measure,
    pub bands: Vec<ScoreBand>,
    /// Feedback when no band matches, the measure's gate refuses to sample,
    /// or a required landmark is below the visibility floor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub miss_feedback: Option<String>,
}

impl Criterion {
    /// Score this criterion against a smoothed frame.
    ///
    /// A landmark below its visibility floor forces the zero band: low
    /// confidence is a scored outcome, never an error.
    pub fn score(&self, frame: &SmoothedFrame) -> CriterionScore {
        let value = if self.measure.all_required_visible(frame) {
            self.measure.sample(frame)
        } else {
            None
        };

        if let Some(value) = value {
            for band in &self.bands {
                if band.matches(value) {
                    return CriterionScore::new(
                        self.name.clone(),
                        band.points.min(self.max_points),
                        self.max_points,
                        band.feedback.clone(),
                    );
                }
            }
        }

        CriterionScore::new(self.name.clone(), 0, self.max_points, self.miss_feedback.clone())
    }
}

/// Run a criteria list and aggregate the result
pub fn evaluate(frame: &SmoothedFrame, criteria: &[Criterion]) -> PoseEvaluation {
    scoring::aggregate(criteria.iter().map(|c| c.score(frame)).collect())
}

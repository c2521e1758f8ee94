//! Exercise definitions and the evaluator dispatch
//!
//! An [`ExerciseDefinition`] pairs user-facing metadata (name, instructions,
//! hold duration) with an [`EvaluatorSpec`] describing how frames are scored.
//! Most exercises are plain criteria lists; tree pose keeps its bespoke
//! evaluator because raised-leg classification does not decompose into
//! independent criteria.
//!
//! Before any evaluator runs, a whole-body visibility preflight rejects
//! frames where the subject is partially out of view. That rejection is a
//! scored red evaluation, not an error.

pub mod generic;
pub mod tree_pose;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::geometry;
use crate::landmark::{SmoothedFrame, KEY_LANDMARKS};
use crate::scoring::{self, CriterionScore, PoseEvaluation};
use crate::{Error, Result};

pub use generic::{Criterion, Measure, ScoreBand};
pub use tree_pose::TreePoseThresholds;

/// Visibility floor for the preflight body check
const PREFLIGHT_VISIBILITY_FLOOR: f32 = 0.4;

/// Fraction of key landmarks that must clear the floor
const PREFLIGHT_VISIBLE_RATIO: f32 = 0.6;

/// Feedback attached to a failed preflight
const PREFLIGHT_FEEDBACK: &str = "Step back and make sure your full body is visible";

/// How an exercise scores frames
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EvaluatorSpec {
    /// Bespoke tree pose evaluator
    TreePose {
        #[serde(default)]
        thresholds: TreePoseThresholds,
    },
    /// Data-driven criteria list
    Criteria { criteria: Vec<Criterion> },
}

/// One exercise the engine can coach
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    /// Stable identifier clients send per frame, e.g. "tree-pose"
    pub id: String,
    /// Display name
    pub name: String,
    /// Instruction text shown before the hold starts
    pub instructions: String,
    /// Seconds the pose must be held to complete
    pub hold_secs: u32,
    pub evaluator: EvaluatorSpec,
}

impl ExerciseDefinition {
    /// Evaluate a smoothed frame.
    ///
    /// The visibility preflight runs first; a mostly invisible body scores
    /// a red zero with step-back feedback and no criterion ever samples.
    pub fn evaluate(&self, frame: &SmoothedFrame) -> PoseEvaluation {
        if !body_visible(frame) {
            debug!(exercise = %self.id, "body visibility preflight failed");
            return preflight_failure();
        }

        match &self.evaluator {
            EvaluatorSpec::TreePose { thresholds } => tree_pose::evaluate(frame, thresholds),
            EvaluatorSpec::Criteria { criteria } => generic::evaluate(frame, criteria),
        }
    }
}

/// True when at least 60% of the torso and leg landmarks are visible
fn body_visible(frame: &SmoothedFrame) -> bool {
    let visible = KEY_LANDMARKS
        .iter()
        .filter(|&&idx| geometry::visible(frame.landmark(idx), PREFLIGHT_VISIBILITY_FLOOR))
        .count();
    visible as f32 / KEY_LANDMARKS.len() as f32 >= PREFLIGHT_VISIBLE_RATIO
}

/// Red zero-accuracy evaluation for a failed preflight
fn preflight_failure() -> PoseEvaluation {
    scoring::aggregate(vec![CriterionScore::new(
        "body-visibility",
        0,
        100,
        Some(PREFLIGHT_FEEDBACK.to_string()),
    )])
}

/// The set of exercises available to a session.
///
/// Ships with built-in definitions; a JSON file in the same shape can
/// replace them entirely.
#[derive(Debug, Clone)]
pub struct ExerciseLibrary {
    exercises: Vec<ExerciseDefinition>,
}

impl ExerciseLibrary {
    /// The built-in exercise set
    pub fn builtin() -> Self {
        Self {
            exercises: vec![tree_pose(), warrior_two(), plank()],
        }
    }

    /// Load definitions from a JSON file, replacing the built-ins
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let exercises: Vec<ExerciseDefinition> = serde_json::from_str(&contents)
            .map_err(|e| Error::Library(format!("{}: {}", path.display(), e)))?;

        let library = Self { exercises };
        library.validate()?;
        info!(
            path = %path.display(),
            count = library.exercises.len(),
            "loaded exercise library"
        );
        Ok(library)
    }

    fn validate(&self) -> Result<()> {
        if self.exercises.is_empty() {
            return Err(Error::Library("library contains no exercises".to_string()));
        }
        for (i, ex) in self.exercises.iter().enumerate() {
            if ex.id.is_empty() {
                return Err(Error::Library(format!("exercise {i} has an empty id")));
            }
            if ex.hold_secs == 0 {
                return Err(Error::Library(format!(
                    "exercise '{}' has a zero hold duration",
                    ex.id
                )));
            }
            if self.exercises[..i].iter().any(|other| other.id == ex.id) {
                return Err(Error::Library(format!("duplicate exercise id '{}'", ex.id)));
            }
        }
        Ok(())
    }

    /// Look up an exercise by id
    pub fn get(&self, id: &str) -> Result<&ExerciseDefinition> {
        self.exercises
            .iter()
            .find(|ex| ex.id == id)
            .ok_or_else(|| Error::UnknownExercise(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExerciseDefinition> {
        self.exercises.iter()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

fn tree_pose() -> ExerciseDefinition {
    ExerciseDefinition {
        id: "tree-pose".to_string(),
        name: "Tree Pose".to_string(),
        instructions: "Stand on one leg, place the other foot on your inner thigh \
                       and raise both arms overhead"
            .to_string(),
        hold_secs: 10,
        evaluator: EvaluatorSpec::TreePose {
            thresholds: TreePoseThresholds::default(),
        },
    }
}

fn warrior_two() -> ExerciseDefinition {
    let band = |min: Option<f32>, max: Option<f32>, points: u32, feedback: &str| ScoreBand {
        min,
        max,
        exclusive: false,
        points,
        feedback: Some(feedback.to_string()),
    };

    ExerciseDefinition {
        id: "warrior-two".to_string(),
        name: "Warrior II".to_string(),
        instructions: "Step wide, bend your front knee to 90 degrees and extend \
                       both arms parallel to the floor"
            .to_string(),
        hold_secs: 15,
        evaluator: EvaluatorSpec::Criteria {
            criteria: vec![
                Criterion {
                    name: "front-knee".to_string(),
                    max_points: 40,
                    measure: Measure::NarrowerKneeAngle,
                    bands: vec![
                        band(Some(80.0), Some(100.0), 40, "Perfect front knee bend"),
                        band(Some(70.0), Some(110.0), 30, "Good bend, aim for 90 degrees"),
                        band(Some(60.0), Some(120.0), 20, "Adjust your front knee bend"),
                    ],
                    miss_feedback: Some("Bend your front knee toward 90 degrees".to_string()),
                },
                Criterion {
                    name: "back-leg".to_string(),
                    max_points: 30,
                    measure: Measure::WiderKneeAngle,
                    bands: vec![
                        band(Some(160.0), None, 30, "Back leg straight"),
                        band(Some(150.0), None, 20, "Straighten your back leg"),
                    ],
                    miss_feedback: Some("Straighten your back leg".to_string()),
                },
                Criterion {
                    name: "arms".to_string(),
                    max_points: 20,
                    measure: Measure::ArmLevelness,
                    bands: vec![
                        band(None, Some(0.1), 20, "Arms level"),
                        band(None, None, 12, "Bring your arms to shoulder height"),
                    ],
                    miss_feedback: Some("Extend your arms out to the sides".to_string()),
                },
                Criterion {
                    name: "torso".to_string(),
                    max_points: 10,
                    measure: Measure::TorsoLean,
                    // Any strictly negative lean (shoulders above hips)
                    bands: vec![ScoreBand {
                        min: None,
                        max: Some(0.0),
                        exclusive: true,
                        points: 10,
                        feedback: Some("Torso upright".to_string()),
                    }],
                    miss_feedback: Some("Keep your torso upright".to_string()),
                },
            ],
        },
    }
}

fn plank() -> ExerciseDefinition {
    let band = |min: Option<f32>, max: Option<f32>, points: u32, feedback: &str| ScoreBand {
        min,
        max,
        exclusive: false,
        points,
        feedback: Some(feedback.to_string()),
    };

    ExerciseDefinition {
        id: "plank".to_string(),
        name: "Plank".to_string(),
        instructions: "Hold your body in a straight line from shoulders to heels"
            .to_string(),
        hold_secs: 20,
        evaluator: EvaluatorSpec::Criteria {
            criteria: vec![
                Criterion {
                    name: "body-line".to_string(),
                    max_points: 50,
                    measure: Measure::BodyLineDeviation,
                    bands: vec![
                        band(None, Some(0.05), 50, "Body in a straight line"),
                        band(None, Some(0.08), 35, "Almost straight, level your hips"),
                    ],
                    miss_feedback: Some(
                        "Straighten your body and keep hips level".to_string(),
                    ),
                },
                Criterion {
                    name: "arms".to_string(),
                    max_points: 25,
                    measure: Measure::ElbowExtension,
                    bands: vec![
                        band(Some(160.0), None, 25, "Arms strong"),
                        band(Some(150.0), None, 18, "Push through your arms"),
                    ],
                    miss_feedback: Some("Extend your arms".to_string()),
                },
                Criterion {
                    name: "shoulder-height".to_string(),
                    max_points: 25,
                    measure: Measure::ShoulderHeight,
                    // Open interval: a shoulder line at exactly 0.3 or 0.7
                    // is out of plank framing
                    bands: vec![ScoreBand {
                        min: Some(0.3),
                        max: Some(0.7),
                        exclusive: true,
                        points: 25,
                        feedback: Some("Good plank height".to_string()),
                    }],
                    miss_feedback: Some("Get into plank position".to_string()),
                },
            ],
        },
    }
}

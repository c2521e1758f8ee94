//! Tree pose evaluator
//!
//! The one exercise whose leg-detection logic does not fit the generic
//! criterion pipeline: which leg is raised must be classified before any
//! scoring happens, from a multi-criterion evidence tally that tolerates a
//! noisy signal on any single check.
//!
//! Criteria and caps: leg height 40, standing leg 30, arms 20, balance 10.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry;
use crate::landmark::{
    Landmark, SmoothedFrame, LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST, NOSE,
    RIGHT_ANKLE, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};
use crate::scoring::{self, CriterionScore, PoseEvaluation};

/// Leg-height step table (fraction of frame height above the hip):
/// ≥ 0.08 → 40, ≥ 0.05 → 35, ≥ 0.03 → 30, any qualifying lift → 25.
const HEIGHT_BANDS: [(f32, u32, &str); 3] = [
    (0.08, 40, "Excellent leg lift"),
    (0.05, 35, "Great leg lift"),
    (0.03, 30, "Good leg lift, keep going higher"),
];

/// Standing-leg angle step table: ≥ 155° straight, ≥ 145° near, else bent.
const STANDING_STRAIGHT_DEG: f32 = 155.0;
const STANDING_NEAR_DEG: f32 = 145.0;

/// Per-criterion thresholds for tree pose
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TreePoseThresholds {
    /// Minimum knee/ankle rise above the hip to count as raise evidence
    pub raise_threshold: f32,
    /// Any rise above this grants "attempting" credit when no leg qualifies
    pub attempt_threshold: f32,
    /// Knee counts as moved inward when its midline distance is below this
    /// fraction of the hip's midline distance
    pub inward_ratio: f32,
    /// Maximum ankle-to-opposite-knee distance for foot-placement evidence
    pub foot_to_knee_max: f32,
    /// Visibility floor on the candidate leg's knee and ankle
    pub leg_visibility_floor: f32,
    /// Visibility floor on the standing leg's knee and ankle
    pub standing_visibility_floor: f32,
    /// Visibility floor on both wrists for the arms criterion
    pub wrist_visibility_floor: f32,
    /// Wrists must clear the shoulders by this margin to count as raised
    pub shoulder_margin: f32,
    /// Maximum shoulder-to-hip midpoint x offset for balance credit
    pub balance_threshold: f32,
}

impl Default for TreePoseThresholds {
    fn default() -> Self {
        Self {
            raise_threshold: 0.02,
            attempt_threshold: 0.01,
            inward_ratio: 0.8,
            foot_to_knee_max: 0.3,
            leg_visibility_floor: 0.25,
            standing_visibility_floor: 0.3,
            wrist_visibility_floor: 0.4,
            shoulder_margin: 0.05,
            balance_threshold: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Evidence tally for one leg's "raised" classification
#[derive(Debug, Clone, Copy)]
struct LegEvidence {
    side: Side,
    /// How far the knee sits above the hip (positive = above)
    knee_rise: f32,
    /// How far the ankle sits above the hip
    ankle_rise: f32,
    /// Count of satisfied sub-checks, 0-4
    tally: u32,
    /// Knee and ankle clear the leg visibility floor
    visible: bool,
}

impl LegEvidence {
    fn qualifies(&self) -> bool {
        self.tally >= 2 && self.visible
    }

    fn max_rise(&self) -> f32 {
        self.knee_rise.max(self.ankle_rise)
    }
}

struct Body {
    nose: Landmark,
    left_shoulder: Landmark,
    right_shoulder: Landmark,
    left_wrist: Landmark,
    right_wrist: Landmark,
    left_hip: Landmark,
    right_hip: Landmark,
    left_knee: Landmark,
    right_knee: Landmark,
    left_ankle: Landmark,
    right_ankle: Landmark,
}

impl Body {
    fn from_frame(frame: &SmoothedFrame) -> Self {
        Self {
            nose: frame.landmark(NOSE),
            left_shoulder: frame.landmark(LEFT_SHOULDER),
            right_shoulder: frame.landmark(RIGHT_SHOULDER),
            left_wrist: frame.landmark(LEFT_WRIST),
            right_wrist: frame.landmark(RIGHT_WRIST),
            left_hip: frame.landmark(LEFT_HIP),
            right_hip: frame.landmark(RIGHT_HIP),
            left_knee: frame.landmark(LEFT_KNEE),
            right_knee: frame.landmark(RIGHT_KNEE),
            left_ankle: frame.landmark(LEFT_ANKLE),
            right_ankle: frame.landmark(RIGHT_ANKLE),
        }
    }

    fn hip(&self, side: Side) -> Landmark {
        match side {
            Side::Left => self.left_hip,
            Side::Right => self.right_hip,
        }
    }

    fn knee(&self, side: Side) -> Landmark {
        match side {
            Side::Left => self.left_knee,
            Side::Right => self.right_knee,
        }
    }

    fn ankle(&self, side: Side) -> Landmark {
        match side {
            Side::Left => self.left_ankle,
            Side::Right => self.right_ankle,
        }
    }

    fn midline_x(&self) -> f32 {
        (self.left_hip.x + self.right_hip.x) / 2.0
    }
}

/// Evaluate a smoothed frame against tree pose
pub fn evaluate(frame: &SmoothedFrame, thresholds: &TreePoseThresholds) -> PoseEvaluation {
    let body = Body::from_frame(frame);

    let left = leg_evidence(&body, Side::Left, thresholds);
    let right = leg_evidence(&body, Side::Right, thresholds);
    let raised = pick_raised_leg(left, right);

    debug!(
        left_tally = left.tally,
        right_tally = right.tally,
        raised = ?raised.map(|e| e.side),
        "tree pose leg classification"
    );

    let criteria = vec![
        leg_height_score(&[left, right], raised, thresholds),
        standing_leg_score(&body, raised, thresholds),
        arms_score(&body, thresholds),
        balance_score(&body, thresholds),
    ];

    scoring::aggregate(criteria)
}

/// 0-4 evidence tally for "this leg is raised": knee above hip, ankle above
/// hip, knee pulled inward toward the midline, and the foot placed near the
/// opposite knee.
fn leg_evidence(body: &Body, side: Side, t: &TreePoseThresholds) -> LegEvidence {
    let hip = body.hip(side);
    let knee = body.knee(side);
    let ankle = body.ankle(side);

    // vertical_offset(hip, knee) > 0 means the knee sits above the hip
    let knee_rise = geometry::vertical_offset(hip, knee);
    let ankle_rise = geometry::vertical_offset(hip, ankle);

    let midline = body.midline_x();
    let knee_inward = (knee.x - midline).abs() < (hip.x - midline).abs() * t.inward_ratio;
    let foot_placed =
        geometry::euclidean(ankle, body.knee(side.opposite())) < t.foot_to_knee_max;

    let tally = u32::from(knee_rise > t.raise_threshold)
        + u32::from(ankle_rise > t.raise_threshold)
        + u32::from(knee_inward)
        + u32::from(foot_placed);

    LegEvidence {
        side,
        knee_rise,
        ankle_rise,
        tally,
        visible: geometry::visible(knee, t.leg_visibility_floor)
            && geometry::visible(ankle, t.leg_visibility_floor),
    }
}

/// When both legs qualify, the one with the larger knee rise wins; an exact
/// tie goes to the left leg so the choice is deterministic frame to frame.
fn pick_raised_leg(left: LegEvidence, right: LegEvidence) -> Option<LegEvidence> {
    match (left.qualifies(), right.qualifies()) {
        (true, false) => Some(left),
        (false, true) => Some(right),
        (true, true) => {
            if right.knee_rise > left.knee_rise {
                Some(right)
            } else {
                Some(left)
            }
        }
        (false, false) => None,
    }
}

/// Leg height, stepped over the best rise of the raised leg (max 40).
/// No qualifying leg but some upward motion earns minimal attempting credit.
fn leg_height_score(
    legs: &[LegEvidence; 2],
    raised: Option<LegEvidence>,
    t: &TreePoseThresholds,
) -> CriterionScore {
    const NAME: &str = "leg-height";
    const MAX: u32 = 40;

    match raised {
        Some(leg) => {
            let rise = leg.max_rise();
            for (floor, points, feedback) in HEIGHT_BANDS {
                if rise >= floor {
                    return CriterionScore::new(NAME, points, MAX, Some(feedback.to_string()));
                }
            }
            CriterionScore::new(NAME, 25, MAX, Some("Lift your leg higher".to_string()))
        }
        None => {
            let attempting = legs
                .iter()
                .any(|leg| leg.knee_rise > t.attempt_threshold || leg.ankle_rise > t.attempt_threshold);
            if attempting {
                CriterionScore::new(
                    NAME,
                    15,
                    MAX,
                    Some("Lift your leg higher - keep trying".to_string()),
                )
            } else {
                CriterionScore::new(NAME, 0, MAX, Some("Lift one leg up".to_string()))
            }
        }
    }
}

/// Standing-leg straightness from the hip-knee-ankle angle (max 30).
/// Skipped entirely when no leg was designated raised; a low-visibility
/// standing leg scores the lowest band rather than erroring.
fn standing_leg_score(
    body: &Body,
    raised: Option<LegEvidence>,
    t: &TreePoseThresholds,
) -> CriterionScore {
    const NAME: &str = "standing-leg";
    const MAX: u32 = 30;

    let Some(raised) = raised else {
        return CriterionScore::new(NAME, 0, MAX, None);
    };

    let standing = raised.side.opposite();
    let knee = body.knee(standing);
    let ankle = body.ankle(standing);

    if !geometry::visible(knee, t.standing_visibility_floor)
        || !geometry::visible(ankle, t.standing_visibility_floor)
    {
        return CriterionScore::new(
            NAME,
            15,
            MAX,
            Some("Keep your standing leg straight".to_string()),
        );
    }

    let angle = geometry::angle(body.hip(standing), knee, ankle);
    if angle >= STANDING_STRAIGHT_DEG {
        CriterionScore::new(NAME, 30, MAX, Some("Standing leg straight".to_string()))
    } else if angle >= STANDING_NEAR_DEG {
        CriterionScore::new(
            NAME,
            22,
            MAX,
            Some("Straighten your standing leg".to_string()),
        )
    } else {
        CriterionScore::new(NAME, 15, MAX, Some("Straighten your leg more".to_string()))
    }
}

/// Arms overhead (max 20): full credit with both wrists above the nose,
/// partial when only above the shoulders.
fn arms_score(body: &Body, t: &TreePoseThresholds) -> CriterionScore {
    const NAME: &str = "arms";
    const MAX: u32 = 20;

    if !geometry::visible(body.left_wrist, t.wrist_visibility_floor)
        || !geometry::visible(body.right_wrist, t.wrist_visibility_floor)
    {
        return CriterionScore::new(NAME, 0, MAX, None);
    }

    // Above on screen means smaller y
    let arms_up = body.left_wrist.y < body.left_shoulder.y - t.shoulder_margin
        && body.right_wrist.y < body.right_shoulder.y - t.shoulder_margin;
    if !arms_up {
        return CriterionScore::new(NAME, 0, MAX, Some("Raise both arms".to_string()));
    }

    if body.left_wrist.y < body.nose.y && body.right_wrist.y < body.nose.y {
        CriterionScore::new(NAME, 20, MAX, Some("Arms overhead".to_string()))
    } else {
        CriterionScore::new(NAME, 12, MAX, Some("Raise your arms higher".to_string()))
    }
}

/// Binary balance check on shoulder/hip midpoint alignment (max 10)
fn balance_score(body: &Body, t: &TreePoseThresholds) -> CriterionScore {
    const NAME: &str = "balance";
    const MAX: u32 = 10;

    let shoulder_mid_x = (body.left_shoulder.x + body.right_shoulder.x) / 2.0;
    let hip_mid_x = (body.left_hip.x + body.right_hip.x) / 2.0;

    if (shoulder_mid_x - hip_mid_x).abs() < t.balance_threshold {
        CriterionScore::new(NAME, 10, MAX, Some("Good balance".to_string()))
    } else {
        CriterionScore::new(NAME, 0, MAX, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::LANDMARK_COUNT;
    use crate::scoring::ColorBand;

    fn blank_frame() -> SmoothedFrame {
        SmoothedFrame {
            landmarks: vec![
                Landmark {
                    x: 0.5,
                    y: 0.5,
                    z: 0.0,
                    visibility: 0.9,
                };
                LANDMARK_COUNT
            ],
            timestamp_ms: 0,
        }
    }

    fn place(frame: &mut SmoothedFrame, idx: usize, x: f32, y: f32) {
        frame.landmarks[idx] = Landmark {
            x,
            y,
            z: 0.0,
            visibility: 0.9,
        };
    }

    /// A well-held tree pose: left leg raised, right leg standing straight,
    /// arms overhead, shoulders over hips.
    fn tree_pose_frame() -> SmoothedFrame {
        let mut f = blank_frame();
        place(&mut f, NOSE, 0.5, 0.20);
        place(&mut f, LEFT_SHOULDER, 0.45, 0.30);
        place(&mut f, RIGHT_SHOULDER, 0.55, 0.30);
        place(&mut f, LEFT_WRIST, 0.45, 0.15);
        place(&mut f, RIGHT_WRIST, 0.55, 0.15);
        place(&mut f, LEFT_HIP, 0.46, 0.55);
        place(&mut f, RIGHT_HIP, 0.54, 0.55);
        // Raised left leg: knee well above the hip, pulled inward, foot on
        // the standing knee
        place(&mut f, LEFT_KNEE, 0.52, 0.46);
        place(&mut f, LEFT_ANKLE, 0.55, 0.68);
        // Standing right leg: vertical hip-knee-ankle line
        place(&mut f, RIGHT_KNEE, 0.54, 0.70);
        place(&mut f, RIGHT_ANKLE, 0.54, 0.85);
        f
    }

    /// Standing at rest: no leg raised, arms down
    fn standing_frame() -> SmoothedFrame {
        let mut f = blank_frame();
        place(&mut f, NOSE, 0.5, 0.15);
        place(&mut f, LEFT_SHOULDER, 0.45, 0.3);
        place(&mut f, RIGHT_SHOULDER, 0.55, 0.3);
        place(&mut f, LEFT_WRIST, 0.44, 0.55);
        place(&mut f, RIGHT_WRIST, 0.56, 0.55);
        place(&mut f, LEFT_HIP, 0.46, 0.55);
        place(&mut f, RIGHT_HIP, 0.54, 0.55);
        place(&mut f, LEFT_KNEE, 0.46, 0.72);
        place(&mut f, RIGHT_KNEE, 0.54, 0.72);
        place(&mut f, LEFT_ANKLE, 0.46, 0.9);
        place(&mut f, RIGHT_ANKLE, 0.54, 0.9);
        f
    }

    #[test]
    fn test_full_tree_pose_scores_green() {
        let eval = evaluate(&tree_pose_frame(), &TreePoseThresholds::default());
        assert_eq!(eval.accuracy, 100.0);
        assert_eq!(eval.color, ColorBand::Green);
        assert!(eval.feedback.contains("Excellent leg lift"));
        assert!(eval.feedback.contains("Standing leg straight"));
        assert!(eval.feedback.contains("Arms overhead"));
        assert!(eval.feedback.contains("Good balance"));
    }

    #[test]
    fn test_standing_at_rest_scores_low() {
        let eval = evaluate(&standing_frame(), &TreePoseThresholds::default());
        // Only balance credit; no lift, standing leg skipped, arms down
        assert_eq!(eval.accuracy, 10.0);
        assert_eq!(eval.color, ColorBand::Red);
        assert!(eval.feedback.contains("Lift one leg up"));
    }

    #[test]
    fn test_full_evidence_tally_qualifies_leg() {
        // Knee 5% above hip, ankle 4% above, inward ratio 0.7, foot at
        // distance 0.25 from the opposite knee: 4/4 evidence
        let mut f = standing_frame();
        place(&mut f, LEFT_HIP, 0.40, 0.55);
        place(&mut f, RIGHT_HIP, 0.60, 0.55);
        // midline 0.5, hip dist 0.10; knee dist 0.07 -> ratio 0.7
        place(&mut f, LEFT_KNEE, 0.43, 0.50);
        // opposite (right) knee at (0.6, 0.72); place ankle 0.25 away
        place(&mut f, RIGHT_KNEE, 0.60, 0.72);
        place(&mut f, LEFT_ANKLE, 0.60, 0.51); // dy = 0.21, dx = 0 -> < 0.3

        let body = Body::from_frame(&f);
        let t = TreePoseThresholds::default();
        let evidence = leg_evidence(&body, Side::Left, &t);
        assert_eq!(evidence.tally, 4);
        assert!(evidence.qualifies());

        // Height band: max rise is the knee's 0.05 -> at least 30 points
        let eval = evaluate(&f, &t);
        let leg = &eval.criteria[0];
        assert_eq!(leg.name, "leg-height");
        assert!(leg.points >= 30, "got {}", leg.points);
    }

    #[test]
    fn test_standing_leg_angle_boundary() {
        // Bend the standing leg's knee to hit angles around the 155° boundary.
        // With hip (0.54, 0.55) and ankle (0.54, 0.85), moving the knee off
        // the line reduces the angle from 180°.
        let t = TreePoseThresholds::default();
        let hip = Landmark {
            x: 0.54,
            y: 0.55,
            z: 0.0,
            visibility: 0.9,
        };
        let ankle = Landmark {
            x: 0.54,
            y: 0.85,
            z: 0.0,
            visibility: 0.9,
        };

        // Find knee offsets bracketing 155 degrees
        let angle_for = |dx: f32| {
            let knee = Landmark {
                x: 0.54 + dx,
                y: 0.70,
                z: 0.0,
                visibility: 0.9,
            };
            geometry::angle(hip, knee, ankle)
        };
        // dx = 0.033 gives ~155.4°, dx = 0.04 gives ~150.4°
        assert!(angle_for(0.033) >= 155.0);
        assert!(angle_for(0.04) < 155.0 && angle_for(0.04) >= 145.0);

        let mut straight = tree_pose_frame();
        place(&mut straight, RIGHT_KNEE, 0.54 + 0.033, 0.70);
        let eval = evaluate(&straight, &t);
        assert_eq!(eval.criteria[1].points, 30, "at or above 155° is straight");

        let mut near = tree_pose_frame();
        place(&mut near, RIGHT_KNEE, 0.54 + 0.04, 0.70);
        let eval = evaluate(&near, &t);
        assert_eq!(eval.criteria[1].points, 22, "just under 155° is near");
    }

    #[test]
    fn test_standing_leg_skipped_without_raised_leg() {
        let eval = evaluate(&standing_frame(), &TreePoseThresholds::default());
        assert_eq!(eval.criteria[1].name, "standing-leg");
        assert_eq!(eval.criteria[1].points, 0);
        assert!(eval.criteria[1].feedback.is_none());
    }

    #[test]
    fn test_standing_leg_low_visibility_scores_lowest_band() {
        let mut f = tree_pose_frame();
        f.landmarks[RIGHT_ANKLE].visibility = 0.2;
        let eval = evaluate(&f, &TreePoseThresholds::default());
        assert_eq!(eval.criteria[1].points, 15);
    }

    #[test]
    fn test_arms_above_shoulders_but_below_nose_partial() {
        let mut f = tree_pose_frame();
        // Wrists 6% above the shoulders (0.30 - 0.06 = 0.24), below the
        // nose (0.20): partial credit, not full
        place(&mut f, LEFT_WRIST, 0.45, 0.24);
        place(&mut f, RIGHT_WRIST, 0.55, 0.24);
        let eval = evaluate(&f, &TreePoseThresholds::default());
        assert_eq!(eval.criteria[2].name, "arms");
        assert_eq!(eval.criteria[2].points, 12);
    }

    #[test]
    fn test_arms_below_visibility_floor_scores_zero() {
        let mut f = tree_pose_frame();
        f.landmarks[LEFT_WRIST].visibility = 0.3;
        let eval = evaluate(&f, &TreePoseThresholds::default());
        assert_eq!(eval.criteria[2].points, 0);
    }

    #[test]
    fn test_leg_below_visibility_floor_never_qualifies() {
        let mut f = tree_pose_frame();
        // The raised leg's position is perfect but invisible: evidence must
        // not classify it as raised
        f.landmarks[LEFT_KNEE].visibility = 0.2;
        f.landmarks[LEFT_ANKLE].visibility = 0.2;
        let body = Body::from_frame(&f);
        let evidence = leg_evidence(&body, Side::Left, &TreePoseThresholds::default());
        assert!(!evidence.qualifies());
    }

    #[test]
    fn test_attempting_credit_without_qualification() {
        let mut f = standing_frame();
        // Knee barely above the hip (1.5%): not enough evidence to qualify,
        // but enough to count as attempting
        place(&mut f, LEFT_KNEE, 0.46, 0.535);
        let eval = evaluate(&f, &TreePoseThresholds::default());
        assert_eq!(eval.criteria[0].points, 15);
    }

    #[test]
    fn test_tie_break_prefers_left_leg() {
        // Symmetric frame where both legs present identical evidence
        let mut f = standing_frame();
        place(&mut f, LEFT_HIP, 0.40, 0.55);
        place(&mut f, RIGHT_HIP, 0.60, 0.55);
        place(&mut f, LEFT_KNEE, 0.47, 0.50);
        place(&mut f, RIGHT_KNEE, 0.53, 0.50);
        place(&mut f, LEFT_ANKLE, 0.53, 0.52);
        place(&mut f, RIGHT_ANKLE, 0.47, 0.52);

        let body = Body::from_frame(&f);
        let t = TreePoseThresholds::default();
        let left = leg_evidence(&body, Side::Left, &t);
        let right = leg_evidence(&body, Side::Right, &t);
        assert_eq!(left.tally, right.tally);
        assert_eq!(left.knee_rise, right.knee_rise);

        let raised = pick_raised_leg(left, right).unwrap();
        assert_eq!(raised.side, Side::Left);
    }

    #[test]
    fn test_larger_rise_wins_when_both_qualify() {
        let mut f = standing_frame();
        place(&mut f, LEFT_HIP, 0.40, 0.55);
        place(&mut f, RIGHT_HIP, 0.60, 0.55);
        place(&mut f, LEFT_KNEE, 0.47, 0.50);
        place(&mut f, RIGHT_KNEE, 0.53, 0.47); // higher rise
        place(&mut f, LEFT_ANKLE, 0.53, 0.49);
        place(&mut f, RIGHT_ANKLE, 0.47, 0.49);

        let body = Body::from_frame(&f);
        let t = TreePoseThresholds::default();
        let left = leg_evidence(&body, Side::Left, &t);
        let right = leg_evidence(&body, Side::Right, &t);
        assert!(left.qualifies() && right.qualifies());

        let raised = pick_raised_leg(left, right).unwrap();
        assert_eq!(raised.side, Side::Right);
    }

    #[test]
    fn test_balance_requires_aligned_midpoints() {
        let mut f = tree_pose_frame();
        place(&mut f, LEFT_SHOULDER, 0.55, 0.30);
        place(&mut f, RIGHT_SHOULDER, 0.65, 0.30);
        let eval = evaluate(&f, &TreePoseThresholds::default());
        assert_eq!(eval.criteria[3].name, "balance");
        assert_eq!(eval.criteria[3].points, 0);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let f = tree_pose_frame();
        let t = TreePoseThresholds::default();
        let a = evaluate(&f, &t);
        let b = evaluate(&f, &t);
        assert_eq!(a.accuracy, b.accuracy);
        assert_eq!(a.criteria, b.criteria);
        assert_eq!(a.feedback, b.feedback);
    }
}

//! Integration tests for the frame pipeline
//!
//! These tests drive full sessions through the public API:
//! Frame input -> Smoother -> Evaluator -> Aggregator -> Countdown -> Output

use std::sync::Arc;

use pose_coach::app::config::Config;
use pose_coach::exercise::ExerciseLibrary;
use pose_coach::landmark::{
    LANDMARK_COUNT, LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST, NOSE, RIGHT_ANKLE,
    RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};
use pose_coach::pipeline::coordinator::NO_POSE_MESSAGE;
use pose_coach::pipeline::{FrameInput, FrameOutput, Session};
use pose_coach::session::SessionEvent;
use pose_coach::time::ManualClock;
use pose_coach::{ColorBand, Error, SmoothingConfig};

// ============================================================================
// Helper Functions
// ============================================================================

/// All landmarks visible at a neutral position
fn base_tuples() -> Vec<[f32; 4]> {
    vec![[0.5, 0.5, 0.0, 0.9]; LANDMARK_COUNT]
}

fn place(tuples: &mut [[f32; 4]], idx: usize, x: f32, y: f32) {
    tuples[idx] = [x, y, 0.0, 0.9];
}

/// A frame holding a full tree pose: left leg raised with the foot on the
/// standing knee, right leg straight, arms overhead, shoulders over hips.
fn tree_pose_tuples() -> Vec<[f32; 4]> {
    let mut t = base_tuples();
    place(&mut t, NOSE, 0.5, 0.20);
    place(&mut t, LEFT_SHOULDER, 0.45, 0.30);
    place(&mut t, RIGHT_SHOULDER, 0.55, 0.30);
    place(&mut t, LEFT_WRIST, 0.45, 0.15);
    place(&mut t, RIGHT_WRIST, 0.55, 0.15);
    place(&mut t, LEFT_HIP, 0.46, 0.55);
    place(&mut t, RIGHT_HIP, 0.54, 0.55);
    place(&mut t, LEFT_KNEE, 0.52, 0.46);
    place(&mut t, LEFT_ANKLE, 0.55, 0.68);
    place(&mut t, RIGHT_KNEE, 0.54, 0.70);
    place(&mut t, RIGHT_ANKLE, 0.54, 0.85);
    t
}

fn input(landmarks: Option<Vec<[f32; 4]>>) -> FrameInput {
    FrameInput {
        exercise_id: "tree-pose".to_string(),
        landmarks,
    }
}

fn session() -> (Session, ManualClock) {
    let clock = ManualClock::new();
    let session = Session::new(
        &ExerciseLibrary::builtin(),
        "tree-pose",
        SmoothingConfig::default(),
        Arc::new(clock.clone()),
    )
    .expect("builtin exercise");
    (session, clock)
}

fn submit(session: &Session, frame: &FrameInput) -> FrameOutput {
    session
        .submit(frame)
        .expect("session open")
        .expect("frame not dropped")
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_tree_pose_frame_scores_green() {
    let (session, _clock) = session();
    let out = submit(&session, &input(Some(tree_pose_tuples())));

    assert!(out.success);
    assert_eq!(out.accuracy, Some(100.0));
    assert_eq!(out.color, Some(ColorBand::Green));
    assert_eq!(out.landmarks.as_ref().map(Vec::len), Some(LANDMARK_COUNT));
    let feedback = out.feedback.expect("feedback present");
    assert!(feedback.contains("Excellent leg lift"));
}

#[test]
fn test_neutral_stance_scores_low_but_succeeds() {
    let (session, _clock) = session();
    // Everything collapsed to one point fails most criteria but is still a
    // successful evaluation, not an error
    let out = submit(&session, &input(Some(base_tuples())));
    assert!(out.success);
    assert!(out.accuracy.unwrap() < 50.0);
    assert_eq!(out.color, Some(ColorBand::Red));
}

#[test]
fn test_missing_landmarks_is_no_pose_output() {
    let (session, _clock) = session();
    let out = submit(&session, &input(None));

    assert!(!out.success);
    assert_eq!(out.message.as_deref(), Some(NO_POSE_MESSAGE));
    assert!(out.accuracy.is_none());
    assert!(out.landmarks.is_none());
    assert!(!out.countdown.holding);
}

#[test]
fn test_partial_landmark_set_is_no_pose_output() {
    let (session, _clock) = session();
    let out = submit(&session, &input(Some(vec![[0.5, 0.5, 0.0, 0.9]; 20])));

    assert!(!out.success);
    assert_eq!(out.message.as_deref(), Some(NO_POSE_MESSAGE));
}

#[test]
fn test_unknown_exercise_rejected_at_session_start() {
    let clock = ManualClock::new();
    let result = Session::new(
        &ExerciseLibrary::builtin(),
        "crow-pose",
        SmoothingConfig::default(),
        Arc::new(clock),
    );
    assert!(matches!(result, Err(Error::UnknownExercise(_))));
}

// ============================================================================
// Hold-to-complete lifecycle
// ============================================================================

#[test]
fn test_hold_to_completion() {
    let (session, clock) = session();
    let green = input(Some(tree_pose_tuples()));

    let out = submit(&session, &green);
    assert_eq!(out.event, Some(SessionEvent::HoldingStarted));
    assert!(out.countdown.holding);
    assert_eq!(out.countdown.remaining_secs, 10);

    clock.advance_secs(4);
    let out = submit(&session, &green);
    assert_eq!(out.event, None);
    assert_eq!(out.countdown.remaining_secs, 6);

    clock.advance_secs(6);
    let out = submit(&session, &green);
    assert_eq!(out.event, Some(SessionEvent::Completed));
    assert_eq!(out.countdown.remaining_secs, 0);
}

#[test]
fn test_pose_loss_resets_hold() {
    let (session, clock) = session();
    let green = input(Some(tree_pose_tuples()));

    submit(&session, &green);
    clock.advance_secs(7);

    // Tracking drops: the countdown resets to the full duration
    let out = submit(&session, &input(None));
    assert!(!out.success);
    assert_eq!(out.event, Some(SessionEvent::HoldingReset));
    assert!(!out.countdown.holding);
    assert_eq!(out.countdown.remaining_secs, 10);

    // Recovering green restarts from scratch
    let out = submit(&session, &green);
    assert_eq!(out.event, Some(SessionEvent::HoldingStarted));
    assert_eq!(out.countdown.remaining_secs, 10);
}

#[test]
fn test_completion_is_emitted_once() {
    let (session, clock) = session();
    let green = input(Some(tree_pose_tuples()));

    submit(&session, &green);
    clock.advance_secs(10);
    let out = submit(&session, &green);
    assert_eq!(out.event, Some(SessionEvent::Completed));

    // Frames after completion are refused without further events
    let out = submit(&session, &green);
    assert!(!out.success);
    assert_eq!(out.event, None);
    assert!(out.message.is_some());
}

#[test]
fn test_tick_completes_hold_without_frames() {
    let (session, clock) = session();
    submit(&session, &input(Some(tree_pose_tuples())));

    clock.advance_secs(9);
    assert_eq!(session.tick(), None);

    clock.advance_secs(1);
    assert_eq!(session.tick(), Some(SessionEvent::Completed));
    assert_eq!(session.tick(), None);
}

#[test]
fn test_cancel_closes_the_session() {
    let (session, clock) = session();
    submit(&session, &input(Some(tree_pose_tuples())));

    session.cancel();
    let err = session.submit(&input(None)).unwrap_err();
    assert!(matches!(err, Error::SessionClosed));

    // No completion can surface after cancellation
    clock.advance_secs(60);
    assert_eq!(session.tick(), None);
}

// ============================================================================
// Wire schema
// ============================================================================

#[test]
fn test_output_serialization_shape() {
    let (session, _clock) = session();
    let out = submit(&session, &input(Some(tree_pose_tuples())));
    let json = serde_json::to_string(&out).unwrap();

    assert!(json.contains("\"success\":true"));
    assert!(json.contains("\"color\":\"green\""));
    assert!(json.contains("\"event\":\"holding_started\""));
    assert!(json.contains("\"countdown\""));
    assert!(!json.contains("\"message\""));

    let out = submit(&session, &input(None));
    let json = serde_json::to_string(&out).unwrap();
    assert!(json.contains("\"success\":false"));
    assert!(json.contains("\"event\":\"holding_reset\""));
    assert!(!json.contains("\"accuracy\""));
}

#[test]
fn test_input_deserializes_without_landmarks() {
    let frame: FrameInput =
        serde_json::from_str(r#"{"exercise_id":"plank"}"#).expect("landmarks optional");
    assert!(frame.landmarks.is_none());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_round_trip_drives_session() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.smoothing.history = 5;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.smoothing.history, 5);

    let clock = ManualClock::new();
    let session = Session::new(
        &ExerciseLibrary::builtin(),
        "plank",
        loaded.smoothing,
        Arc::new(clock),
    )
    .unwrap();
    assert_eq!(session.exercise().id, "plank");
}

#[test]
fn test_invalid_config_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[smoothing]\nhistory = 0\nalpha = 0.4\nvisibility_gate = 0.5\n")
        .unwrap();
    assert!(matches!(Config::load(&path), Err(Error::Config(_))));
}

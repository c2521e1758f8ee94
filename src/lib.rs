//! # Pose Coach
//!
//! A real-time pose-evaluation engine. It turns a stream of per-frame body
//! landmarks (as produced by an external pose-estimation model) into a numeric
//! accuracy score, a red/yellow/green band, coaching feedback text, and a
//! hold-to-complete countdown gate.
//!
//! ## Overview
//!
//! Each tracking session owns an independent pipeline: raw landmark frames are
//! temporally smoothed, scored against the selected exercise's criteria,
//! aggregated into a total accuracy and color band, and fed into a countdown
//! state machine that requires the pose to be held for a configured number of
//! wall-clock seconds.
//!
//! ## Architecture
//!
//! The system is organized into the following modules:
//!
//! - [`landmark`]: Landmark/frame data model and semantic body indices
//! - [`geometry`]: Angle and distance primitives on landmark positions
//! - [`smoothing`]: Recency-weighted temporal filter for noisy landmarks
//! - [`scoring`]: Criterion scores, accuracy aggregation, color bands
//! - [`exercise`]: Per-exercise evaluators and the exercise library
//! - [`session`]: Hold-to-complete countdown state machine
//! - [`pipeline`]: Per-session frame coordinator with single-flight gating
//! - [`time`]: Monotonic clock abstraction (manual clock for tests)
//! - [`app`]: CLI and configuration management
//!
//! ## Frame Pipeline
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │  Raw Frame  │───▶│  Smoother   │───▶│  Evaluator  │───▶│ Aggregator  │
//! │ (landmarks) │    │ (temporal)  │    │ (criteria)  │    │(total,color)│
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//!                                                                 │
//!                                                                 ▼
//! ┌─────────────┐    ┌─────────────┐    ┌──────────────────────────────┐
//! │   Output    │◀───│  Countdown  │◀───│ accuracy ≥ 70 AND color green│
//! │  Message    │    │   Machine   │    │  sustained for hold duration │
//! └─────────────┘    └─────────────┘    └──────────────────────────────┘
//! ```

pub mod app;
pub mod exercise;
pub mod geometry;
pub mod landmark;
pub mod pipeline;
pub mod scoring;
pub mod session;
pub mod smoothing;
pub mod time;

// Re-export commonly used types
pub use exercise::{ExerciseDefinition, ExerciseLibrary};
pub use landmark::{Frame, Landmark, SmoothedFrame, LANDMARK_COUNT};
pub use pipeline::{FrameInput, FrameOutput, Session};
pub use scoring::{ColorBand, CriterionScore, PoseEvaluation};
pub use session::{Countdown, SessionEvent};
pub use smoothing::{LandmarkSmoother, SmoothingConfig};
pub use time::{Clock, ManualClock, MonotonicClock};

/// Result type alias for the pose engine
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the pose engine.
///
/// Per-frame conditions (no pose detected, malformed frames, low-visibility
/// landmarks) are deliberately *not* errors: they degrade to non-success
/// outputs or lowest-band criterion scores. Only configuration problems are
/// fatal, and then only for the session they affect.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    #[error("Exercise library error: {0}")]
    Library(String),

    #[error("Session is closed")]
    SessionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

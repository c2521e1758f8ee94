//! Frame pipeline
//!
//! The coordinator owns everything a session needs per frame: the smoother,
//! the evaluator dispatch and the countdown. Frame processing is
//! single-flight; a frame arriving while another is in flight is dropped and
//! counted, never queued, so a backed-up caller sees fresh results instead
//! of a growing latency tail.

pub mod coordinator;
pub mod messages;

pub use coordinator::{Session, SessionStats};
pub use messages::{CountdownStatus, FrameInput, FrameOutput};

//! Session coordinator
//!
//! One [`Session`] per exercise attempt. It owns the per-session mutable
//! state (smoother and countdown) behind a mutex whose `try_lock` is the
//! single-flight gate: a frame that arrives while another is being processed
//! is dropped and counted rather than queued.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::exercise::{ExerciseDefinition, ExerciseLibrary};
use crate::pipeline::messages::{CountdownStatus, FrameInput, FrameOutput};
use crate::scoring::ColorBand;
use crate::session::{Countdown, SessionEvent};
use crate::smoothing::{LandmarkSmoother, SmoothingConfig};
use crate::time::Clock;
use crate::{Error, Result};

/// Message for frames where no usable pose was detected
pub const NO_POSE_MESSAGE: &str = "No person detected. Step back to show full body.";

/// Message for frames submitted after the hold completed
const COMPLETED_MESSAGE: &str = "Exercise already completed";

/// Frame counters, updated without taking the session lock
#[derive(Debug, Default)]
pub struct SessionStats {
    frames_processed: AtomicU64,
    frames_dropped: AtomicU64,
}

impl SessionStats {
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed.load(Ordering::Relaxed)
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped.load(Ordering::Relaxed)
    }
}

/// Per-session mutable state, guarded by the single-flight mutex
struct SessionInner {
    smoother: LandmarkSmoother,
    countdown: Countdown,
}

/// One exercise attempt: frames in, evaluations and lifecycle events out
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    definition: ExerciseDefinition,
    inner: Mutex<SessionInner>,
    cancelled: AtomicBool,
    stats: SessionStats,
    clock: Arc<dyn Clock>,
}

impl Session {
    /// Start a session for `exercise_id`.
    ///
    /// An id the library does not know is a configuration error and fails
    /// the whole session up front.
    pub fn new(
        library: &ExerciseLibrary,
        exercise_id: &str,
        smoothing: SmoothingConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let definition = library.get(exercise_id)?.clone();
        let id = Uuid::new_v4();
        info!(
            session = %id,
            exercise = %definition.id,
            hold_secs = definition.hold_secs,
            "session started"
        );

        Ok(Self {
            id,
            started_at: Utc::now(),
            inner: Mutex::new(SessionInner {
                smoother: LandmarkSmoother::new(smoothing),
                countdown: Countdown::new(definition.hold_secs),
            }),
            definition,
            cancelled: AtomicBool::new(false),
            stats: SessionStats::default(),
            clock,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn exercise(&self) -> &ExerciseDefinition {
        &self.definition
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Submit one frame.
    ///
    /// Returns `Ok(None)` when the frame was dropped because another frame
    /// is in flight. Per-frame failures (no pose, partial landmarks) are
    /// `success: false` outputs; the only errors are session-level ones.
    pub fn submit(&self, input: &FrameInput) -> Result<Option<FrameOutput>> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(Error::SessionClosed);
        }

        let Some(mut inner) = self.inner.try_lock() else {
            self.stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
            debug!(session = %self.id, "frame dropped, processing in flight");
            return Ok(None);
        };

        // cancel() sets the flag while holding this lock, so a re-check
        // under the lock cannot race with it
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(Error::SessionClosed);
        }

        let output = self.process(&mut inner, input);
        self.stats.frames_processed.fetch_add(1, Ordering::Relaxed);
        Ok(Some(output))
    }

    fn process(&self, inner: &mut SessionInner, input: &FrameInput) -> FrameOutput {
        let now_ms = self.clock.now_ms();

        if input.exercise_id != self.definition.id {
            // The session's exercise is authoritative; a mismatched id on a
            // frame is logged and otherwise ignored.
            debug!(
                session = %self.id,
                got = %input.exercise_id,
                expected = %self.definition.id,
                "frame exercise id mismatch"
            );
        }

        if inner.countdown.is_completed() {
            return FrameOutput::failed(COMPLETED_MESSAGE, self.status(inner, now_ms), None);
        }

        // Missing landmarks or a partial set both take the no-pose path:
        // accumulated smoothing state is discarded and the countdown sees a
        // non-qualifying observation, resetting any hold in progress.
        let smoothed = input
            .to_frame(now_ms)
            .and_then(|frame| inner.smoother.smooth(&frame));
        let Some(smoothed) = smoothed else {
            inner.smoother.reset();
            let event = inner.countdown.observe(0.0, ColorBand::Red, now_ms);
            return FrameOutput::failed(NO_POSE_MESSAGE, self.status(inner, now_ms), event);
        };

        let evaluation = self.definition.evaluate(&smoothed);
        let event = inner
            .countdown
            .observe(evaluation.accuracy, evaluation.color, now_ms);
        if event == Some(SessionEvent::Completed) {
            info!(session = %self.id, exercise = %self.definition.id, "hold completed");
        }

        FrameOutput::evaluated(
            smoothed.to_tuples(),
            &evaluation,
            self.status(inner, now_ms),
            event,
        )
    }

    /// Advance the countdown on wall-clock time with no frame in flight
    pub fn tick(&self) -> Option<SessionEvent> {
        let mut inner = self.inner.lock();
        if self.cancelled.load(Ordering::SeqCst) {
            return None;
        }
        inner.countdown.tick(self.clock.now_ms())
    }

    /// Countdown snapshot for status displays
    pub fn countdown_status(&self) -> CountdownStatus {
        let inner = self.inner.lock();
        self.status(&inner, self.clock.now_ms())
    }

    /// Close the session. Subsequent submissions fail with
    /// [`Error::SessionClosed`] and no further events are emitted.
    ///
    /// Blocks until any frame currently being processed finishes, so the
    /// cancellation point is ordered after every event the session will
    /// ever emit.
    pub fn cancel(&self) {
        let _inner = self.inner.lock();
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            info!(
                session = %self.id,
                processed = self.stats.frames_processed(),
                dropped = self.stats.frames_dropped(),
                "session cancelled"
            );
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn status(&self, inner: &SessionInner, now_ms: u64) -> CountdownStatus {
        CountdownStatus {
            holding: inner.countdown.is_holding(),
            remaining_secs: inner.countdown.remaining_secs(now_ms),
        }
    }
}

//! Landmark smoothing
//!
//! Raw per-frame landmarks jitter; consumers need bounded-lag temporal
//! stability without unbounded delay. The smoother combines two stages:
//!
//! 1. A recency-weighted average over a bounded ring of recent raw frames
//!    (the frame at buffer position `i` of `n` carries weight `i + 1`,
//!    normalized). This is deliberately not a uniform moving average.
//! 2. An exponential blend against the previous smoothed output, gated per
//!    landmark on visibility in both the current average and the previous
//!    smoothed frame. Low-confidence points pass through unblended so stale
//!    positions are not smeared over them.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::landmark::{Frame, Landmark, SmoothedFrame, LANDMARK_COUNT};

/// Smoothing parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Ring buffer capacity for the recency-weighted average
    pub history: usize,
    /// Exponential blend factor: output = prev * alpha + new * (1 - alpha)
    pub alpha: f32,
    /// Visibility required (in both current and previous frame) for a
    /// landmark to participate in the exponential blend
    pub visibility_gate: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            history: 3,
            alpha: 0.4,
            visibility_gate: 0.5,
        }
    }
}

/// Temporal filter over a session's landmark stream.
///
/// One instance per session; it owns the ring of recent raw frames and the
/// previous smoothed output.
#[derive(Debug)]
pub struct LandmarkSmoother {
    config: SmoothingConfig,
    history: VecDeque<Vec<Landmark>>,
    prev: Option<Vec<Landmark>>,
}

impl LandmarkSmoother {
    pub fn new(config: SmoothingConfig) -> Self {
        Self {
            config,
            history: VecDeque::with_capacity(config.history),
            prev: None,
        }
    }

    /// Smooth one raw frame.
    ///
    /// Returns `None` when the frame does not carry the full landmark set
    /// (tracking lost); smoothing is bypassed entirely and accumulated state
    /// is discarded so a stale history cannot leak into the next detection.
    pub fn smooth(&mut self, frame: &Frame) -> Option<SmoothedFrame> {
        if !frame.is_complete() {
            debug!(
                landmarks = frame.landmarks.len(),
                expected = LANDMARK_COUNT,
                "incomplete frame, bypassing smoother"
            );
            self.reset();
            return None;
        }

        if self.history.len() == self.config.history {
            self.history.pop_front();
        }
        self.history.push_back(frame.landmarks.clone());

        let averaged = self.weighted_average();
        let blended = self.blend_with_previous(averaged);
        self.prev = Some(blended.clone());

        Some(SmoothedFrame {
            landmarks: blended,
            timestamp_ms: frame.timestamp_ms,
        })
    }

    /// Discard all accumulated history and the previous output
    pub fn reset(&mut self) {
        self.history.clear();
        self.prev = None;
    }

    /// Recency-weighted average across the buffered frames. With a single
    /// buffered frame this is the identity, which gives the documented
    /// first-frame pass-through.
    fn weighted_average(&self) -> Vec<Landmark> {
        let n = self.history.len();
        let weight_sum: f32 = (1..=n).map(|w| w as f32).sum();

        let mut out = vec![Landmark::default(); LANDMARK_COUNT];
        for (i, frame) in self.history.iter().enumerate() {
            let w = (i + 1) as f32 / weight_sum;
            for (acc, lm) in out.iter_mut().zip(frame.iter()) {
                acc.x += lm.x * w;
                acc.y += lm.y * w;
                acc.z += lm.z * w;
                acc.visibility += lm.visibility * w;
            }
        }
        out
    }

    /// Exponential blend against the previous smoothed output, applied only
    /// to landmarks that pass the visibility gate in both frames.
    fn blend_with_previous(&self, current: Vec<Landmark>) -> Vec<Landmark> {
        let Some(prev) = &self.prev else {
            return current;
        };
        let alpha = self.config.alpha;
        let gate = self.config.visibility_gate;

        current
            .into_iter()
            .zip(prev.iter())
            .map(|(cur, old)| {
                if cur.visibility > gate && old.visibility > gate {
                    Landmark {
                        x: old.x * alpha + cur.x * (1.0 - alpha),
                        y: old.y * alpha + cur.y * (1.0 - alpha),
                        z: old.z * alpha + cur.z * (1.0 - alpha),
                        visibility: cur.visibility,
                    }
                } else {
                    cur
                }
            })
            .collect()
    }
}

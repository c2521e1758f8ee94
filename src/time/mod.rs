//! Time sources
//!
//! The countdown depends on elapsed wall-clock time, so the clock is a trait
//! seam: production uses a monotonic clock, tests drive a manual one and
//! never sleep.

pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

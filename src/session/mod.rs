//! Hold tracking for an exercise session
//!
//! A session completes when the user holds the pose at green accuracy for
//! the exercise's full hold duration. The countdown is driven by wall-clock
//! time, not frame arrival, so a slow camera never stretches the hold.

pub mod countdown;

pub use countdown::{Countdown, CountdownState, SessionEvent, HOLD_ACCURACY_FLOOR};

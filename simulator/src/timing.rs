//! Timing constants for the simulator.
//!
//! These use `std::time::Duration`, which the `no_std` library does not have.

use std::time::Duration;

/// Target frame time (~50 FPS). The main loop sleeps if frame completes early.
pub const FRAME_TIME: Duration = Duration::from_millis(20);

/// Longest step fed to the animator, so a stalled window does not skip a whole transition.
pub const MAX_TICK_MS: u32 = 100;

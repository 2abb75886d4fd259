//! Synthetic rotation source.
//!
//! Stands in for a motion sensor: every tick advances the yaw
//! component by a fixed step. State persists across sessions, so the
//! scene keeps turning between clients.

use std::time::Duration;

use holocast_core::protocol::stream::RotationVector;

/// Interval between rotation updates.
pub const TICK: Duration = Duration::from_millis(50);

/// Yaw advance per tick, in radians.
pub const YAW_STEP: f64 = 0.05;

#[derive(Debug, Default)]
pub struct MotionSource {
    theta: RotationVector,
}

impl MotionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick and return the current rotation.
    pub fn tick(&mut self) -> RotationVector {
        self.theta.y += YAW_STEP;
        self.theta
    }
}

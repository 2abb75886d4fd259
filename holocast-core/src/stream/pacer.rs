//! Adaptive frame pacing.
//!
//! The sender cannot know ahead of time what one encode+send cycle
//! costs, so the pacer converges its period toward that cost: a cycle
//! that overruns the period grows it by half the overshoot and starts
//! the next cycle immediately; a cycle that finishes early shrinks the
//! period by half the slack and waits out the remainder. Because the
//! latest frame is always sent synchronously before the next cycle is
//! scheduled, the backlog of unsent frames never grows.

use std::time::Duration;

/// Default pacing period: 25 frames per second.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(40);

/// Exponentially-damped proportional controller over the send period.
#[derive(Debug, Clone)]
pub struct FramePacer {
    /// Current period between cycle starts, in milliseconds. Kept as
    /// f64 so the damping never truncates.
    period_ms: f64,
}

impl FramePacer {
    /// Pacer at the default 25 fps target.
    pub fn new() -> Self {
        Self::with_period(DEFAULT_PERIOD)
    }

    /// Pacer with an explicit initial period.
    pub fn with_period(period: Duration) -> Self {
        Self {
            period_ms: period.as_secs_f64() * 1000.0,
        }
    }

    /// Current period between cycle starts.
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(self.period_ms / 1000.0)
    }

    /// Feed the measured cost of one encode+send cycle. Returns how
    /// long to wait before starting the next cycle.
    pub fn complete_cycle(&mut self, elapsed: Duration) -> Duration {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let overshoot = elapsed_ms - self.period_ms;
        if overshoot > 0.0 {
            // Over budget: grow the period, start again immediately.
            self.period_ms += overshoot / 2.0;
            Duration::ZERO
        } else {
            self.period_ms -= (-overshoot) / 2.0;
            Duration::from_secs_f64((self.period_ms - elapsed_ms).max(0.0) / 1000.0)
        }
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────────

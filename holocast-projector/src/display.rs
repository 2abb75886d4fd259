//! Frame consumer.
//!
//! Decodes incoming frames and folds them into rolling session stats.
//! Actual on-screen painting belongs to the display surface, not this
//! crate; the stats are what the operator sees in the log.

use std::time::Instant;

use tracing::{debug, info};

use holocast_core::HolocastError;
use holocast_core::protocol::stream::FrameImage;

/// How often to log session stats, in frames.
const STATS_EVERY: u64 = 100;

/// Per-session frame statistics.
#[derive(Debug, Default)]
pub struct Display {
    /// Current smoothed frames per second.
    fps: f64,
    /// Total frames received this session.
    total_frames: u64,
    /// Total encoded bytes received this session.
    total_bytes: u64,
    /// Last frame dimensions.
    width: u32,
    height: u32,
    last_frame_at: Option<Instant>,
}

impl Display {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one incoming frame and update the stats.
    pub fn ingest(&mut self, encoded: &[u8]) -> Result<(), HolocastError> {
        let image = FrameImage::decode(encoded)?;

        let now = Instant::now();
        if let Some(prev) = self.last_frame_at {
            let dt = now.duration_since(prev).as_secs_f64();
            if dt > 0.0 {
                let sample = 1.0 / dt;
                // EWMA: fps = 7/8 * fps + 1/8 * sample
                self.fps = if self.fps == 0.0 {
                    sample
                } else {
                    self.fps * 7.0 / 8.0 + sample / 8.0
                };
            }
        }
        self.last_frame_at = Some(now);

        self.total_frames += 1;
        self.total_bytes += encoded.len() as u64;
        self.width = image.width;
        self.height = image.height;

        debug!(seq = image.seq, bytes = encoded.len(), "frame painted");
        if self.total_frames % STATS_EVERY == 0 {
            info!(
                frames = self.total_frames,
                kib = self.total_bytes / 1024,
                fps = %format_args!("{:.1}", self.fps),
                width = self.width,
                height = self.height,
                "session stats"
            );
        }
        Ok(())
    }

    /// Reset for the next session.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

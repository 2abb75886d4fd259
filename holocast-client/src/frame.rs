//! Synthetic frame source.
//!
//! Stands in for the real scene renderer, which is out of scope: it
//! paints a bouncing dot into a luminance framebuffer sized to the
//! projector's target resolution, shaded by the current rotation, and
//! compresses it at a fixed level. The signaling and pacing layers
//! only care that each cycle yields one encoded payload.

use async_trait::async_trait;
use tokio::sync::watch;

use holocast_core::protocol::stream::{FrameImage, RotationVector, TargetResolution};
use holocast_core::{FrameSource, HolocastError};

use crate::render::RenderState;

/// Fixed compression level — the "quality knob" never moves.
pub const ENCODE_LEVEL: i32 = 3;

const DOT_RADIUS: f64 = 20.0;
const DOT_STEP: f64 = 4.0;

pub struct PatternSource {
    resolution: watch::Receiver<TargetResolution>,
    rotation: watch::Receiver<RotationVector>,
    seq: u64,
    pos: f64,
    step: f64,
}

impl PatternSource {
    pub fn new(render: &RenderState) -> Self {
        Self {
            resolution: render.watch_resolution(),
            rotation: render.watch_rotation(),
            seq: 0,
            pos: DOT_RADIUS,
            step: DOT_STEP,
        }
    }

    fn render(&mut self) -> FrameImage {
        let res = *self.resolution.borrow();
        let rot = *self.rotation.borrow();
        let width = res.width.max(1);
        let height = res.height.max(1);
        let (w, h) = (width as usize, height as usize);
        let mut pixels = vec![0u8; w * h];

        // Bounce across the middle row.
        let min_x = DOT_RADIUS.min(w as f64 - 1.0);
        let max_x = (w as f64 - DOT_RADIUS).max(min_x);
        self.pos += self.step;
        if self.pos > max_x {
            self.pos = max_x;
            self.step = -self.step;
        } else if self.pos < min_x {
            self.pos = min_x;
            self.step = -self.step;
        }

        let level = (128.0 + rot.y.sin() * 127.0).clamp(0.0, 255.0) as u8;
        let (cx, cy) = (self.pos, h as f64 / 2.0);
        let y_lo = ((cy - DOT_RADIUS).floor().max(0.0)) as usize;
        let y_hi = ((cy + DOT_RADIUS).ceil() as usize).min(h);
        let x_lo = ((cx - DOT_RADIUS).floor().max(0.0)) as usize;
        let x_hi = ((cx + DOT_RADIUS).ceil() as usize).min(w);
        for y in y_lo..y_hi {
            for x in x_lo..x_hi {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                if dx * dx + dy * dy <= DOT_RADIUS * DOT_RADIUS {
                    pixels[y * w + x] = level;
                }
            }
        }

        let image = FrameImage {
            seq: self.seq,
            width,
            height,
            pixels,
        };
        self.seq += 1;
        image
    }
}

#[async_trait]
impl FrameSource for PatternSource {
    async fn next_frame(&mut self) -> Result<Vec<u8>, HolocastError> {
        self.render().encode(ENCODE_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frames_decode_and_count_up() {
        let state = RenderState::new();
        let mut source = PatternSource::new(&state);

        let first = FrameImage::decode(&source.next_frame().await.unwrap()).unwrap();
        let second = FrameImage::decode(&source.next_frame().await.unwrap()).unwrap();

        assert_eq!(first.seq, 0);
        assert_eq!(second.seq, 1);
        assert!(first.pixels.iter().any(|&p| p > 0), "dot must be painted");
    }

    #[tokio::test]
    async fn frames_track_target_resolution() {
        let state = RenderState::new();
        let mut source = PatternSource::new(&state);

        state.set_resolution(TargetResolution {
            width: 320,
            height: 200,
        });
        let image = FrameImage::decode(&source.next_frame().await.unwrap()).unwrap();
        assert_eq!((image.width, image.height), (320, 200));
        assert_eq!(image.pixels.len(), 320 * 200);
    }

    #[tokio::test]
    async fn tiny_surfaces_do_not_panic() {
        let state = RenderState::new();
        state.set_resolution(TargetResolution {
            width: 1,
            height: 1,
        });
        let mut source = PatternSource::new(&state);
        let image = FrameImage::decode(&source.next_frame().await.unwrap()).unwrap();
        assert_eq!(image.pixels.len(), 1);
    }
}

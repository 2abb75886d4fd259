//! Adaptive frame streaming — pacing controller and send loop.

pub mod pacer;
pub mod service;

pub use pacer::FramePacer;
pub use service::{FrameSink, FrameSource, StreamService};

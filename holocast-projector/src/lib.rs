//! # holocast-projector
//!
//! Projector endpoint: announces readiness to the hub, parks a
//! data-plane tunnel under its own id, and serves one client session
//! at a time — publishing rotation vectors and debounced resolution
//! updates, consuming the client's frame stream.

pub mod control;
pub mod display;
pub mod motion;
pub mod resize;
pub mod tunnel;

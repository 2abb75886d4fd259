//! # holocast-client
//!
//! Client endpoint: asks the hub for a projector, opens the data-plane
//! tunnel once assigned, and streams synthetically rendered frames at
//! an adaptively paced rate while applying the projector's rotation
//! and resolution updates.

pub mod control;
pub mod frame;
pub mod render;

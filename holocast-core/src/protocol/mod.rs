//! Structured payload definitions for the two signaling planes.
//!
//! Control payloads travel between an endpoint and the hub; stream
//! payloads travel between a paired projector and client over the
//! data-plane tunnel. Payloads are serialized with `serde` + `bincode`
//! and carried inside [`Packet`] bodies.
//!
//! [`Packet`]: crate::packet::Packet

pub mod control;
pub mod stream;

// Re-export the most commonly used types at the protocol level.
pub use control::{
    ClientGone, ClientReady, ProjectorAssigned, ProjectorGone, ProjectorReady, TunnelOpen,
    TunnelRole,
};
pub use stream::{
    FrameImage, FrameRendered, ResolutionChanged, RotationVector, TargetResolution, VectorChanged,
};

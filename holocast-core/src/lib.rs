//! # holocast-core
//!
//! Core protocol library for the holocast projection system.
//!
//! This crate contains:
//! - **Protocol types**: `PacketHeader`, `Packet`, `MessageKind`, `PacketFlags`
//! - **Protocol payloads**: control-plane rendezvous messages and data-plane
//!   stream messages (rotation, resolution, frames)
//! - **Codec**: `HolocastCodec` for framed TCP I/O via `tokio_util`
//! - **Network**: `Connection` for managed TCP connections with heartbeat
//! - **Broker**: the session broker pairing one projector with one client
//!   at a time, with a fair wait queue
//! - **Stream**: `FramePacer` + `StreamService` — the adaptive frame-pacing
//!   send loop
//! - **Error**: `HolocastError` — typed, `thiserror`-based error hierarchy

pub mod broker;
pub mod codec;
pub mod error;
pub mod flags;
pub mod header;
pub mod identity;
pub mod message;
pub mod network;
pub mod packet;
pub mod protocol;
pub mod stream;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use broker::{Broker, DirectiveSender, PeerRole};
pub use codec::HolocastCodec;
pub use error::HolocastError;
pub use flags::PacketFlags;
pub use header::{HEADER_SIZE, PacketHeader};
pub use identity::EndpointId;
pub use message::MessageKind;
pub use network::{Connection, ConnectionSender};
pub use packet::{MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, Packet};
pub use stream::{FramePacer, FrameSink, FrameSource, StreamService};

//! Protocol message kinds.
//!
//! Uses proper enums with `TryFrom` — no panics on unknown values.
//! Unknown discriminants surface as a typed error so dispatch layers
//! can log and drop the message instead of killing the connection.

use std::fmt;

use crate::error::HolocastError;

/// All message kinds understood by the holocast protocol.
///
/// Organized by plane:
/// - `0x0001..0x00FF` — keep-alive
/// - `0x0100..0x01FF` — control plane (endpoint ↔ hub rendezvous)
/// - `0x0200..0x02FF` — tunnel rendezvous (endpoint → relay)
/// - `0x0300..0x03FF` — data plane (projector ↔ client)
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    // ── Keep-alive (0x00xx) ──────────────────────────────────────
    /// Periodic heartbeat; consumed by the connection layer.
    Heartbeat = 0x0001,

    // ── Control plane (0x01xx) ───────────────────────────────────
    /// A client announces it wants to be paired.
    ClientReady = 0x0101,
    /// A projector announces it can take a client.
    ProjectorReady = 0x0102,
    /// Hub → client: which projector to open a tunnel to.
    ProjectorAssigned = 0x0103,
    /// Hub → projector: its paired client is gone.
    ClientGone = 0x0104,
    /// Hub → client: its projector is gone; tear down and wait.
    ProjectorGone = 0x0105,

    // ── Tunnel rendezvous (0x02xx) ───────────────────────────────
    /// First packet on a data-plane connection: who am I, which
    /// pairing key do I belong to.
    TunnelOpen = 0x0201,

    // ── Data plane (0x03xx) ──────────────────────────────────────
    /// Projector → client: the output surface changed size.
    ResolutionChanged = 0x0301,
    /// Projector → client: the rotation vector changed.
    VectorChanged = 0x0302,
    /// Client → projector: one encoded frame.
    FrameRendered = 0x0303,
}

impl TryFrom<u32> for MessageKind {
    type Error = HolocastError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0x0001 => Ok(MessageKind::Heartbeat),

            0x0101 => Ok(MessageKind::ClientReady),
            0x0102 => Ok(MessageKind::ProjectorReady),
            0x0103 => Ok(MessageKind::ProjectorAssigned),
            0x0104 => Ok(MessageKind::ClientGone),
            0x0105 => Ok(MessageKind::ProjectorGone),

            0x0201 => Ok(MessageKind::TunnelOpen),

            0x0301 => Ok(MessageKind::ResolutionChanged),
            0x0302 => Ok(MessageKind::VectorChanged),
            0x0303 => Ok(MessageKind::FrameRendered),

            _ => Err(HolocastError::UnknownVariant {
                type_name: "MessageKind",
                value: value as u64,
            }),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl MessageKind {
    /// Returns `true` for messages exchanged with the hub's broker.
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            MessageKind::ClientReady
                | MessageKind::ProjectorReady
                | MessageKind::ProjectorAssigned
                | MessageKind::ClientGone
                | MessageKind::ProjectorGone
        )
    }

    /// Returns `true` for messages exchanged over the data-plane tunnel.
    pub fn is_stream(&self) -> bool {
        matches!(
            self,
            MessageKind::ResolutionChanged
                | MessageKind::VectorChanged
                | MessageKind::FrameRendered
        )
    }
}

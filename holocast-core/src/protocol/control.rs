//! Control-plane payloads — rendezvous and session status.
//!
//! # Wire Protocol
//!
//! ```text
//! Client    ──[ClientReady]───────────► Hub
//! Projector ──[ProjectorReady]────────► Hub
//! Hub       ──[ProjectorAssigned]─────► Client     (pairing directive)
//! Hub       ──[ClientGone]────────────► Projector
//! Hub       ──[ProjectorGone]─────────► Client
//! Either    ──[TunnelOpen]────────────► Relay      (first packet on a
//!                                                   data-plane connection)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::HolocastError;
use crate::identity::EndpointId;
use crate::message::MessageKind;
use crate::packet::Packet;

// ── ClientReady ──────────────────────────────────────────────────

/// A client announces it wants to be paired with a projector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientReady {
    pub client_id: EndpointId,
}

impl ClientReady {
    pub fn to_bytes(&self) -> Result<Vec<u8>, HolocastError> {
        bincode::serialize(self).map_err(|e| HolocastError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HolocastError> {
        bincode::deserialize(bytes).map_err(|e| HolocastError::Encoding(e.to_string()))
    }

    pub fn into_packet(self) -> Result<Packet, HolocastError> {
        let payload = self.to_bytes()?;
        Packet::new(MessageKind::ClientReady, payload)
    }
}

// ── ProjectorReady ───────────────────────────────────────────────

/// A projector announces it can take a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectorReady {
    pub projector_id: EndpointId,
}

impl ProjectorReady {
    pub fn to_bytes(&self) -> Result<Vec<u8>, HolocastError> {
        bincode::serialize(self).map_err(|e| HolocastError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HolocastError> {
        bincode::deserialize(bytes).map_err(|e| HolocastError::Encoding(e.to_string()))
    }

    pub fn into_packet(self) -> Result<Packet, HolocastError> {
        let payload = self.to_bytes()?;
        Packet::new(MessageKind::ProjectorReady, payload)
    }
}

// ── ProjectorAssigned ────────────────────────────────────────────

/// Hub → client: open a data-plane tunnel keyed on this projector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectorAssigned {
    pub projector_id: EndpointId,
}

impl ProjectorAssigned {
    pub fn to_bytes(&self) -> Result<Vec<u8>, HolocastError> {
        bincode::serialize(self).map_err(|e| HolocastError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HolocastError> {
        bincode::deserialize(bytes).map_err(|e| HolocastError::Encoding(e.to_string()))
    }

    pub fn into_packet(self) -> Result<Packet, HolocastError> {
        let payload = self.to_bytes()?;
        Packet::new(MessageKind::ProjectorAssigned, payload)
    }
}

// ── ClientGone / ProjectorGone ───────────────────────────────────

/// Hub → projector: the paired client disconnected. Empty payload, but
/// we define a type for consistency and future extensibility.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClientGone;

impl ClientGone {
    pub fn into_packet(self) -> Result<Packet, HolocastError> {
        Packet::new(MessageKind::ClientGone, Vec::new())
    }
}

/// Hub → client: the projector disconnected; tear down and await
/// re-pairing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProjectorGone;

impl ProjectorGone {
    pub fn into_packet(self) -> Result<Packet, HolocastError> {
        Packet::new(MessageKind::ProjectorGone, Vec::new())
    }
}

// ── TunnelOpen ───────────────────────────────────────────────────

/// Which side of a pairing a tunnel connection belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TunnelRole {
    Projector,
    Client,
}

impl TunnelRole {
    /// The role this one pairs with.
    pub fn counterpart(&self) -> TunnelRole {
        match self {
            TunnelRole::Projector => TunnelRole::Client,
            TunnelRole::Client => TunnelRole::Projector,
        }
    }
}

/// First packet on every data-plane connection: introduces the sender
/// to the relay. `key` is the projector id of the pairing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TunnelOpen {
    pub key: EndpointId,
    pub role: TunnelRole,
}

impl TunnelOpen {
    pub fn to_bytes(&self) -> Result<Vec<u8>, HolocastError> {
        bincode::serialize(self).map_err(|e| HolocastError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HolocastError> {
        bincode::deserialize(bytes).map_err(|e| HolocastError::Encoding(e.to_string()))
    }

    pub fn into_packet(self) -> Result<Packet, HolocastError> {
        let payload = self.to_bytes()?;
        Packet::new(MessageKind::TunnelOpen, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ready_roundtrip() {
        let msg = ClientReady {
            client_id: EndpointId::from("c-1"),
        };
        let packet = msg.clone().into_packet().unwrap();
        assert_eq!(packet.kind().unwrap(), MessageKind::ClientReady);
        let decoded = ClientReady::from_bytes(packet.payload()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn assigned_roundtrip() {
        let msg = ProjectorAssigned {
            projector_id: EndpointId::from("p-1"),
        };
        let packet = msg.clone().into_packet().unwrap();
        let decoded = ProjectorAssigned::from_bytes(packet.payload()).unwrap();
        assert_eq!(decoded.projector_id.as_str(), "p-1");
    }

    #[test]
    fn gone_messages_are_empty() {
        assert_eq!(ClientGone.into_packet().unwrap().payload_len(), 0);
        assert_eq!(ProjectorGone.into_packet().unwrap().payload_len(), 0);
    }

    #[test]
    fn tunnel_roles_pair_up() {
        assert_eq!(TunnelRole::Projector.counterpart(), TunnelRole::Client);
        assert_eq!(TunnelRole::Client.counterpart(), TunnelRole::Projector);
    }

    #[test]
    fn tunnel_open_roundtrip() {
        let msg = TunnelOpen {
            key: EndpointId::from("p-1"),
            role: TunnelRole::Client,
        };
        let packet = msg.clone().into_packet().unwrap();
        assert_eq!(packet.kind().unwrap(), MessageKind::TunnelOpen);
        assert_eq!(TunnelOpen::from_bytes(packet.payload()).unwrap(), msg);
    }
}

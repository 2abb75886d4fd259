//! Data-plane payloads — rotation, resolution, frames.
//!
//! These travel directly between a paired projector and client once
//! both have opened their tunnel; the hub's broker never sees them.
//! Rotation and resolution are last-write-wins: no history is kept,
//! a newer value simply replaces the older one.

use serde::{Deserialize, Serialize};

use crate::error::HolocastError;
use crate::flags::PacketFlags;
use crate::message::MessageKind;
use crate::packet::Packet;

// ── Domain values ────────────────────────────────────────────────

/// Rotation of the rendered scene, one angle per axis, in radians.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct RotationVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Output surface dimensions the client should render for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetResolution {
    pub width: u32,
    pub height: u32,
}

impl Default for TargetResolution {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

// ── ResolutionChanged ────────────────────────────────────────────

/// Projector → client: the output surface changed size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolutionChanged {
    pub width: u32,
    pub height: u32,
}

impl ResolutionChanged {
    pub fn resolution(&self) -> TargetResolution {
        TargetResolution {
            width: self.width,
            height: self.height,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, HolocastError> {
        bincode::serialize(self).map_err(|e| HolocastError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HolocastError> {
        bincode::deserialize(bytes).map_err(|e| HolocastError::Encoding(e.to_string()))
    }

    pub fn into_packet(self) -> Result<Packet, HolocastError> {
        let payload = self.to_bytes()?;
        Packet::new(MessageKind::ResolutionChanged, payload)
    }
}

// ── VectorChanged ────────────────────────────────────────────────

/// Projector → client: the rotation vector changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorChanged {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl VectorChanged {
    pub fn from_vector(v: RotationVector) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }

    pub fn vector(&self) -> RotationVector {
        RotationVector {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, HolocastError> {
        bincode::serialize(self).map_err(|e| HolocastError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HolocastError> {
        bincode::deserialize(bytes).map_err(|e| HolocastError::Encoding(e.to_string()))
    }

    pub fn into_packet(self) -> Result<Packet, HolocastError> {
        let payload = self.to_bytes()?;
        Packet::new(MessageKind::VectorChanged, payload)
    }
}

// ── FrameRendered ────────────────────────────────────────────────

/// Client → projector: one encoded frame. The signaling layers treat
/// `frame` as opaque bytes; only the endpoints agree on its encoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameRendered {
    pub frame: Vec<u8>,
}

impl FrameRendered {
    pub fn to_bytes(&self) -> Result<Vec<u8>, HolocastError> {
        bincode::serialize(self).map_err(|e| HolocastError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HolocastError> {
        bincode::deserialize(bytes).map_err(|e| HolocastError::Encoding(e.to_string()))
    }

    pub fn into_packet(self) -> Result<Packet, HolocastError> {
        let payload = self.to_bytes()?;
        Packet::with_flags(MessageKind::FrameRendered, PacketFlags::STREAMING, payload)
    }
}

// ── FrameImage ───────────────────────────────────────────────────

/// The frame encoding the bundled endpoints agree on: a bincode image
/// record compressed with zstd at a fixed level. Carried opaquely
/// inside [`FrameRendered`] — nothing between the two endpoints ever
/// inspects it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameImage {
    /// Sequential frame number (0-based).
    pub seq: u64,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Row-major 8-bit luminance samples.
    pub pixels: Vec<u8>,
}

impl FrameImage {
    /// Encode at the given zstd level (the fixed quality parameter).
    pub fn encode(&self, level: i32) -> Result<Vec<u8>, HolocastError> {
        let raw = bincode::serialize(self)?;
        zstd::encode_all(raw.as_slice(), level).map_err(|e| HolocastError::Encoding(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, HolocastError> {
        let raw =
            zstd::decode_all(bytes).map_err(|e| HolocastError::Encoding(e.to_string()))?;
        bincode::deserialize(&raw).map_err(|e| HolocastError::Encoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_roundtrip() {
        let msg = VectorChanged {
            x: 0.1,
            y: -1.2,
            z: 3.4,
        };
        let packet = msg.clone().into_packet().unwrap();
        assert_eq!(packet.kind().unwrap(), MessageKind::VectorChanged);
        let decoded = VectorChanged::from_bytes(packet.payload()).unwrap();
        assert_eq!(decoded.vector(), msg.vector());
    }

    #[test]
    fn resolution_roundtrip() {
        let msg = ResolutionChanged {
            width: 1920,
            height: 1080,
        };
        let packet = msg.clone().into_packet().unwrap();
        let decoded = ResolutionChanged::from_bytes(packet.payload()).unwrap();
        assert_eq!(
            decoded.resolution(),
            TargetResolution {
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn frame_packet_carries_streaming_flag() {
        let packet = FrameRendered { frame: vec![9; 64] }.into_packet().unwrap();
        assert!(packet.flags().contains(PacketFlags::STREAMING));
        let decoded = FrameRendered::from_bytes(packet.payload()).unwrap();
        assert_eq!(decoded.frame.len(), 64);
    }

    #[test]
    fn frame_image_encode_decode() {
        let image = FrameImage {
            seq: 7,
            width: 8,
            height: 4,
            pixels: vec![0u8; 32],
        };
        let encoded = image.encode(3).unwrap();
        let decoded = FrameImage::decode(&encoded).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn frame_image_decode_rejects_garbage() {
        assert!(FrameImage::decode(b"not zstd at all").is_err());
    }
}

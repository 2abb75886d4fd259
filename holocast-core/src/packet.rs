//! Packet — a framed protocol unit (header + bincode payload).

use crate::error::HolocastError;
use crate::flags::PacketFlags;
use crate::header::PacketHeader;
use crate::message::MessageKind;

/// Maximum payload size. Frames dominate; everything else is tiny.
pub const MAX_PAYLOAD_SIZE: usize = 8 * 1024 * 1024;

/// Maximum total frame size accepted by the codec.
pub const MAX_FRAME_SIZE: usize = PacketHeader::SIZE + MAX_PAYLOAD_SIZE;

/// A single framed protocol message.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    header: PacketHeader,
    payload: Vec<u8>,
}

impl Packet {
    /// Build a packet for `kind` with no flags set.
    pub fn new(kind: MessageKind, payload: Vec<u8>) -> Result<Self, HolocastError> {
        Self::with_flags(kind, PacketFlags::empty(), payload)
    }

    /// Build a packet with explicit flags.
    pub fn with_flags(
        kind: MessageKind,
        flags: PacketFlags,
        payload: Vec<u8>,
    ) -> Result<Self, HolocastError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(HolocastError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        let header = PacketHeader {
            checksum: Self::checksum_of(&payload),
            kind: kind as u32,
            flags: flags.bits(),
            payload_len: payload.len() as u32,
        };
        Ok(Self { header, payload })
    }

    /// Keep-alive packet. Empty payload, infallible.
    pub fn heartbeat() -> Self {
        Self {
            header: PacketHeader {
                checksum: 0,
                kind: MessageKind::Heartbeat as u32,
                flags: 0,
                payload_len: 0,
            },
            payload: Vec::new(),
        }
    }

    /// The raw kind discriminant, valid or not.
    pub fn raw_kind(&self) -> u32 {
        self.header.kind
    }

    /// The message kind, or a typed error for unknown discriminants.
    pub fn kind(&self) -> Result<MessageKind, HolocastError> {
        MessageKind::try_from(self.header.kind)
    }

    pub fn flags(&self) -> PacketFlags {
        PacketFlags::from_bits_truncate(self.header.flags)
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Serialize header + payload into one buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.header.encode().to_vec();
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Deserialize from an exact header + payload buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HolocastError> {
        let header = PacketHeader::decode(bytes)?;
        let expected = PacketHeader::SIZE + header.payload_len as usize;
        if bytes.len() != expected {
            return Err(HolocastError::InvalidPacketLength {
                expected,
                actual: bytes.len(),
            });
        }
        if header.payload_len as usize > MAX_PAYLOAD_SIZE {
            return Err(HolocastError::PayloadTooLarge {
                size: header.payload_len as usize,
                max: MAX_PAYLOAD_SIZE,
            });
        }
        Ok(Self {
            header,
            payload: bytes[PacketHeader::SIZE..].to_vec(),
        })
    }

    /// Whether the stored checksum matches the payload. Empty payloads
    /// carry checksum 0 and always verify.
    pub fn verify_checksum(&self) -> bool {
        self.header.checksum == Self::checksum_of(&self.payload)
    }

    fn checksum_of(payload: &[u8]) -> u32 {
        if payload.is_empty() {
            return 0;
        }
        let hash = blake3::hash(payload);
        u32::from_le_bytes(hash.as_bytes()[0..4].try_into().unwrap())
    }
}

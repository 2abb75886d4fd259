//! Framed codec for holocast packets over TCP.
//!
//! Decodes the fixed header, waits for the full payload, then validates
//! the checksum for non-empty payloads. Unknown message kinds are *not*
//! rejected here — dispatch layers log and drop them, so a stray
//! message never kills the connection.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::HolocastError;
use crate::header::PacketHeader;
use crate::packet::{MAX_FRAME_SIZE, Packet};

#[derive(Debug, Default)]
pub struct HolocastCodec;

impl Decoder for HolocastCodec {
    type Item = Packet;
    type Error = HolocastError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>, HolocastError> {
        if src.len() < PacketHeader::SIZE {
            return Ok(None);
        }
        let header = PacketHeader::decode(&src[..PacketHeader::SIZE])?;
        let total = PacketHeader::SIZE + header.payload_len as usize;
        if total > MAX_FRAME_SIZE {
            return Err(HolocastError::FrameTooLarge {
                size: total,
                max: MAX_FRAME_SIZE,
            });
        }
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }
        let bytes = src.split_to(total);
        let packet = Packet::from_bytes(&bytes)?;
        if packet.payload_len() > 0 && !packet.verify_checksum() {
            return Err(HolocastError::ChecksumMismatch);
        }
        Ok(Some(packet))
    }
}

impl Encoder<Packet> for HolocastCodec {
    type Error = HolocastError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), HolocastError> {
        dst.extend_from_slice(&item.to_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageKind;

    #[test]
    fn partial_input_yields_none() {
        let mut codec = HolocastCodec;
        let packet = Packet::new(MessageKind::ClientReady, b"hello".to_vec()).unwrap();
        let bytes = packet.to_bytes();

        let mut buf = BytesMut::from(&bytes[..PacketHeader::SIZE + 2]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(&bytes[PacketHeader::SIZE + 2..]);
        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let mut codec = HolocastCodec;
        let packet = Packet::new(MessageKind::VectorChanged, vec![1, 2, 3]).unwrap();

        let mut buf = BytesMut::new();
        codec.encode(packet.clone(), &mut buf).unwrap();
        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, packet);
        assert!(buf.is_empty());
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let mut codec = HolocastCodec;
        let packet = Packet::new(MessageKind::FrameRendered, b"frame".to_vec()).unwrap();
        let mut bytes = packet.to_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        let mut buf = BytesMut::from(&bytes[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(HolocastError::ChecksumMismatch)
        ));
    }

    #[test]
    fn back_to_back_packets() {
        let mut codec = HolocastCodec;
        let first = Packet::new(MessageKind::ClientReady, b"a".to_vec()).unwrap();
        let second = Packet::heartbeat();

        let mut buf = BytesMut::new();
        buf.extend_from_slice(&first.to_bytes());
        buf.extend_from_slice(&second.to_bytes());

        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), first);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), second);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }
}

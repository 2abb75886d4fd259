//! Packet header flags.

use bitflags::bitflags;

bitflags! {
    /// Bit flags carried in the packet header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PacketFlags: u32 {
        /// Packet is part of a continuous stream (frame traffic).
        const STREAMING = 0b0001;
    }
}

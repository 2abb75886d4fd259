//! Domain-specific error types for the holocast protocol.
//!
//! All fallible operations return `Result<T, HolocastError>`.
//! No panics on invalid input — every error is typed and recoverable.

use std::time::Duration;
use thiserror::Error;

/// The canonical error type for the holocast protocol.
#[derive(Debug, Error)]
pub enum HolocastError {
    // ── Protocol Errors ──────────────────────────────────────────
    /// Received bytes that do not start with the holocast magic sequence.
    #[error("invalid magic bytes: expected HCS0")]
    InvalidMagic,

    /// A field in the packet header could not be parsed.
    #[error("invalid header: {0}")]
    InvalidHeader(&'static str),

    /// The packet payload failed checksum verification.
    #[error("checksum mismatch")]
    ChecksumMismatch,

    /// A numeric value did not map to any known enum variant.
    #[error("unknown {type_name} discriminant: {value:#x}")]
    UnknownVariant { type_name: &'static str, value: u64 },

    /// A message violated protocol rules.
    #[error("protocol violation: {0}")]
    ProtocolViolation(&'static str),

    // ── Packet Errors ────────────────────────────────────────────
    /// The payload exceeds the configured maximum size.
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The received frame is shorter or longer than expected.
    #[error("invalid packet length: expected {expected}, got {actual}")]
    InvalidPacketLength { expected: usize, actual: usize },

    /// Frame size exceeded the codec limit.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    // ── Connection Errors ────────────────────────────────────────
    /// The TCP/IO layer reported an error.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// An mpsc channel was closed unexpectedly.
    #[error("channel closed")]
    ChannelClosed,

    /// An operation exceeded its deadline.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    // ── Serialization Errors ─────────────────────────────────────
    /// Encoding or decoding of a payload failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    // ── Session Errors ───────────────────────────────────────────
    /// The streaming session was cancelled.
    #[error("session cancelled")]
    Cancelled,

    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

// ── Convenient From implementations ──────────────────────────────

impl From<String> for HolocastError {
    fn from(s: String) -> Self {
        HolocastError::Other(s)
    }
}

impl From<&str> for HolocastError {
    fn from(s: &str) -> Self {
        HolocastError::Other(s.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for HolocastError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        HolocastError::ChannelClosed
    }
}

impl From<Box<bincode::ErrorKind>> for HolocastError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        HolocastError::Encoding(e.to_string())
    }
}

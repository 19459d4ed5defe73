//! Protocol-level error types.
//!
//! These errors cover header parsing, frame (de)serialization and the
//! bounds enforced by the wire format. They never carry I/O state —
//! socket failures are the transport crate's concern.

use thiserror::Error;

/// Errors produced while parsing or building frames and headers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtoError {
    /// The 2-byte length prefix was missing or claimed fewer than 2 bytes.
    #[error("invalid header: length prefix {0} is below the minimum of 2")]
    InvalidHeader(u16),

    /// A frame claimed a length exceeding `u16::MAX` or the caller's limit.
    #[error("frame too large: {size} exceeds maximum {max}")]
    FrameTooLarge {
        /// Size that was rejected.
        size: usize,
        /// Maximum size permitted.
        max: usize,
    },

    /// Fewer bytes were available than the frame's declared length.
    #[error("frame truncated: expected {expected} bytes, got {actual}")]
    FrameTruncated {
        /// Bytes the frame claimed to contain.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// The buffer was too short to hold a fixed packet header.
    #[error("header too short: need {need} bytes, got {got}")]
    HeaderTooShort {
        /// Bytes required.
        need: usize,
        /// Bytes available.
        got: usize,
    },

    /// A text payload exceeded its declared maximum size.
    #[error("payload too large: {size} exceeds maximum {max}")]
    PayloadTooLarge {
        /// Size that was rejected.
        size: usize,
        /// Maximum size permitted.
        max: usize,
    },

    /// The payload bytes were not valid UTF-8 where UTF-8 was required.
    #[error("invalid utf-8 payload")]
    InvalidUtf8,

    /// No deserializer is registered for the given magic number.
    #[error("unknown frame magic: {0:#010x}")]
    UnknownMagic(u32),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ProtoError>;

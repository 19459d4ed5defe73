//! Fixed packet header shared by every frame family.
//!
//! The header is a 9-byte, little-endian, zero-copy structure:
//! `magic(4) + op_code(2) + flags(1) + priority(1) + transport(1)`.
//! It is always followed by the family-specific body. Parsing never
//! copies the body — callers slice it out of the caller-owned buffer.

use bitflags::bitflags;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::error::{ProtoError, Result};

bitflags! {
    /// Per-frame processing flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FrameFlags: u8 {
        /// No flags set.
        const NONE = 0;
        /// Body was passed through a registered `compress` transformer.
        const COMPRESSED = 1 << 0;
        /// Body was passed through a registered `encrypt` transformer.
        const ENCRYPTED = 1 << 1;
        /// Body carries a detached or embedded signature.
        const SIGNED = 1 << 2;
    }
}

/// Delivery priority, highest value first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Priority {
    /// Best-effort, droppable under pressure.
    Low = 0,
    /// Default priority for ordinary traffic.
    Normal = 1,
    /// Time-sensitive control traffic.
    High = 2,
    /// Must not be delayed or dropped (e.g. shutdown notices).
    Urgent = 3,
}

impl Priority {
    /// Decode a priority byte. `None` if the byte is out of range.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Low),
            1 => Some(Self::Normal),
            2 => Some(Self::High),
            3 => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// Which transport a packet is destined for or arrived over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Transport {
    /// No transport preference; caller decides.
    None = 0,
    /// Send over the connection's TCP stream.
    Tcp = 1,
    /// Send over the connection's UDP socket.
    Udp = 2,
}

impl Transport {
    /// Decode a transport byte. `None` if the byte is out of range.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Tcp),
            2 => Some(Self::Udp),
            _ => None,
        }
    }
}

/// A 32-bit frame family discriminator.
///
/// Registered once per packet family at [`crate::registry`] bootstrap;
/// duplicates are rejected there, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameMagic(pub u32);

impl FrameMagic {
    /// Raw payload, no framing beyond the common header.
    pub const BINARY: Self = Self(0x4E58_4231); // "NXB1"
    /// UTF-8 text, capped at [`crate::families::text::Text256::MAX_LEN`].
    pub const TEXT_256: Self = Self(0x4E58_5432); // "NXT2"
    /// Sequencing/keepalive control messages.
    pub const CONTROL: Self = Self(0x4E58_4333); // "NXC3"
    /// Opaque cryptographic handshake material.
    pub const HANDSHAKE: Self = Self(0x4E58_4834); // "NXH4"
    /// Compact server-to-client instruction.
    pub const DIRECTIVE: Self = Self(0x4E58_4435); // "NXD5"

    /// The raw `u32` value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for FrameMagic {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Fixed 9-byte packet header (little-endian on the wire).
///
/// `repr(C, packed)` with `zerocopy` traits lets this be cast directly
/// from an untrusted byte slice: all 9-byte patterns are structurally
/// valid (unknown flag bits and out-of-range enum bytes are caught by
/// the accessor methods, not by the cast itself).
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct PacketHeader {
    magic: [u8; 4],
    op_code: [u8; 2],
    flags: u8,
    priority: u8,
    transport: u8,
}

impl PacketHeader {
    /// Size of the serialized header in bytes.
    pub const SIZE: usize = 9;

    /// Build a header from its logical fields.
    #[must_use]
    pub fn new(
        magic: FrameMagic,
        op_code: u16,
        flags: FrameFlags,
        priority: Priority,
        transport: Transport,
    ) -> Self {
        Self {
            magic: magic.0.to_le_bytes(),
            op_code: op_code.to_le_bytes(),
            flags: flags.bits(),
            priority: priority as u8,
            transport: transport as u8,
        }
    }

    /// Parse a header from the front of `bytes` without copying the body.
    ///
    /// # Errors
    ///
    /// - [`ProtoError::HeaderTooShort`] if `bytes` is shorter than
    ///   [`Self::SIZE`].
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(bytes)
            .map(|(header, _rest)| header)
            .map_err(|_| ProtoError::HeaderTooShort { need: Self::SIZE, got: bytes.len() })
    }

    /// Serialize this header to a 9-byte array.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(IntoBytes::as_bytes(self));
        out
    }

    /// Frame family discriminator.
    #[must_use]
    pub fn magic(&self) -> u32 {
        u32::from_le_bytes(self.magic)
    }

    /// Operation code within the family.
    #[must_use]
    pub fn op_code(&self) -> u16 {
        u16::from_le_bytes(self.op_code)
    }

    /// Raw processing flags.
    #[must_use]
    pub fn flags(&self) -> FrameFlags {
        FrameFlags::from_bits_truncate(self.flags)
    }

    /// Priority enum, if the stored byte is in range.
    #[must_use]
    pub fn priority(&self) -> Option<Priority> {
        Priority::from_u8(self.priority)
    }

    /// Transport tag, if the stored byte is in range.
    #[must_use]
    pub fn transport(&self) -> Option<Transport> {
        Transport::from_u8(self.transport)
    }

    /// Set the processing flags in place.
    pub fn set_flags(&mut self, flags: FrameFlags) {
        self.flags = flags.bits();
    }
}

// Packed layout forbids a derived Debug/PartialEq (misaligned field refs).
impl std::fmt::Debug for PacketHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketHeader")
            .field("magic", &format!("{:#010x}", self.magic()))
            .field("op_code", &self.op_code())
            .field("flags", &self.flags())
            .field("priority", &self.priority)
            .field("transport", &self.transport)
            .finish()
    }
}

impl PartialEq for PacketHeader {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PacketHeader {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_size_is_nine() {
        assert_eq!(PacketHeader::SIZE, 9);
        assert_eq!(std::mem::size_of::<PacketHeader>(), 9);
    }

    #[test]
    fn round_trip_fields() {
        let header = PacketHeader::new(
            FrameMagic::BINARY,
            0x1234,
            FrameFlags::COMPRESSED | FrameFlags::SIGNED,
            Priority::High,
            Transport::Tcp,
        );

        let bytes = header.to_bytes();
        let parsed = PacketHeader::from_bytes(&bytes).expect("should parse");

        assert_eq!(parsed.magic(), FrameMagic::BINARY.value());
        assert_eq!(parsed.op_code(), 0x1234);
        assert_eq!(parsed.flags(), FrameFlags::COMPRESSED | FrameFlags::SIGNED);
        assert_eq!(parsed.priority(), Some(Priority::High));
        assert_eq!(parsed.transport(), Some(Transport::Tcp));
    }

    #[test]
    fn rejects_short_buffer() {
        let short = [0u8; 8];
        assert_eq!(
            PacketHeader::from_bytes(&short),
            Err(ProtoError::HeaderTooShort { need: 9, got: 8 })
        );
    }

    #[test]
    fn little_endian_on_wire() {
        let header =
            PacketHeader::new(FrameMagic(0x0102_0304), 0x0506, FrameFlags::NONE, Priority::Low, Transport::None);
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[4..6], &[0x06, 0x05]);
    }

    #[test]
    fn out_of_range_enum_bytes_are_none() {
        let mut bytes = [0u8; PacketHeader::SIZE];
        bytes[7] = 0xFF; // priority byte
        bytes[8] = 0xFF; // transport byte
        let header = PacketHeader::from_bytes(&bytes).expect("should parse");
        assert_eq!(header.priority(), None);
        assert_eq!(header.transport(), None);
    }
}

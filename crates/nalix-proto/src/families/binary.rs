//! Raw binary payload — the family with no structure beyond the common
//! header. Used for application data the caller already framed itself
//! (e.g. a pre-serialized game-state blob).

use bytes::{BufMut, Bytes};

use crate::{
    error::{ProtoError, Result},
    header::{FrameFlags, FrameMagic, PacketHeader, Priority, Transport},
    packet::PacketKind,
};

/// A frame carrying an opaque byte payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPacket {
    /// Operation category within the Binary family.
    pub op_code: u16,
    /// Processing flags (compression/encryption/signing).
    pub flags: FrameFlags,
    /// Delivery priority.
    pub priority: Priority,
    /// Destination transport.
    pub transport: Transport,
    /// Raw payload bytes.
    pub payload: Bytes,
}

impl BinaryPacket {
    /// Largest payload a single frame can carry, bounded by the 2-byte
    /// length prefix and the fixed header — not a family-specific cap.
    pub const MAX_LEN: usize = u16::MAX as usize - PacketHeader::SIZE - 2;

    /// Build a new Binary packet with default flags/priority/transport.
    #[must_use]
    pub fn new(op_code: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            op_code,
            flags: FrameFlags::NONE,
            priority: Priority::Normal,
            transport: Transport::None,
            payload: payload.into(),
        }
    }
}

impl PacketKind for BinaryPacket {
    const MAGIC: FrameMagic = FrameMagic::BINARY;

    fn op_code(&self) -> u16 {
        self.op_code
    }

    fn flags(&self) -> FrameFlags {
        self.flags
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn transport(&self) -> Transport {
        self.transport
    }

    fn length(&self) -> u16 {
        (PacketHeader::SIZE + self.payload.len()) as u16
    }

    fn serialize_into(&self, dst: &mut dyn BufMut) -> Result<()> {
        if self.payload.len() > Self::MAX_LEN {
            return Err(ProtoError::PayloadTooLarge { size: self.payload.len(), max: Self::MAX_LEN });
        }
        dst.put_slice(&self.header().to_bytes());
        dst.put_slice(&self.payload);
        Ok(())
    }

    fn decode_body(header: &PacketHeader, body: &[u8]) -> Result<Self> {
        Ok(Self {
            op_code: header.op_code(),
            flags: header.flags(),
            priority: header.priority().unwrap_or(Priority::Normal),
            transport: header.transport().unwrap_or(Transport::None),
            payload: Bytes::copy_from_slice(body),
        })
    }

    fn reset_for_pool(&mut self) {
        self.op_code = 0;
        self.flags = FrameFlags::NONE;
        self.priority = Priority::Normal;
        self.transport = Transport::None;
        self.payload = Bytes::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let packet = BinaryPacket::new(7, Bytes::from_static(b"ABC"));
        let wire = packet.serialize();

        let header = PacketHeader::from_bytes(&wire).expect("header");
        let body = &wire[PacketHeader::SIZE..];
        let decoded = BinaryPacket::decode_body(header, body).expect("decode");

        assert_eq!(decoded.payload, Bytes::from_static(b"ABC"));
        assert_eq!(decoded.op_code, 7);
    }

    #[test]
    fn reset_clears_payload() {
        let mut packet = BinaryPacket::new(1, Bytes::from_static(b"x"));
        packet.reset_for_pool();
        assert!(packet.payload.is_empty());
        assert_eq!(packet.op_code, 0);
    }
}

//! UTF-8 text payloads capped at a small fixed size, intended for chat
//! lines and other short human-readable messages.

use bytes::{BufMut, Bytes};

use crate::{
    error::{ProtoError, Result},
    header::{FrameFlags, FrameMagic, PacketHeader, Priority, Transport},
    packet::PacketKind,
};

/// A frame carrying a short UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text256Packet {
    /// Operation category within the Text256 family.
    pub op_code: u16,
    /// Processing flags (compression/encryption/signing).
    pub flags: FrameFlags,
    /// Delivery priority.
    pub priority: Priority,
    /// Destination transport.
    pub transport: Transport,
    /// Text body, never longer than [`Self::MAX_LEN`] bytes.
    pub text: String,
}

impl Text256Packet {
    /// Largest text body this family accepts, in bytes.
    pub const MAX_LEN: usize = 256;

    /// Build a new Text256 packet with default flags/priority/transport.
    #[must_use]
    pub fn new(op_code: u16, text: impl Into<String>) -> Self {
        Self {
            op_code,
            flags: FrameFlags::NONE,
            priority: Priority::Normal,
            transport: Transport::None,
            text: text.into(),
        }
    }
}

impl PacketKind for Text256Packet {
    const MAGIC: FrameMagic = FrameMagic::TEXT_256;

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
        (PacketHeader::SIZE + self.text.len()) as u16
    }

    fn serialize_into(&self, dst: &mut dyn BufMut) -> Result<()> {
        if self.text.len() > Self::MAX_LEN {
            return Err(ProtoError::PayloadTooLarge { size: self.text.len(), max: Self::MAX_LEN });
        }
        dst.put_slice(&self.header().to_bytes());
        dst.put_slice(self.text.as_bytes());
        Ok(())
    }

    fn decode_body(header: &PacketHeader, body: &[u8]) -> Result<Self> {
        if body.len() > Self::MAX_LEN {
            return Err(ProtoError::PayloadTooLarge { size: body.len(), max: Self::MAX_LEN });
        }
        let text = std::str::from_utf8(body).map_err(|_| ProtoError::InvalidUtf8)?.to_owned();
        Ok(Self {
            op_code: header.op_code(),
            flags: header.flags(),
            priority: header.priority().unwrap_or(Priority::Normal),
            transport: header.transport().unwrap_or(Transport::None),
            text,
        })
    }

    fn reset_for_pool(&mut self) {
        self.op_code = 0;
        self.flags = FrameFlags::NONE;
        self.priority = Priority::Normal;
        self.transport = Transport::None;
        self.text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn round_trip() {
        let packet = Text256Packet::new(3, "hello");
        let wire: Bytes = packet.serialize();

        let header = PacketHeader::from_bytes(&wire).expect("header");
        let body = &wire[PacketHeader::SIZE..];
        let decoded = Text256Packet::decode_body(header, body).expect("decode");

        assert_eq!(decoded.text, "hello");
    }

    #[test]
    fn rejects_invalid_utf8() {
        let header = PacketHeader::new(FrameMagic::TEXT_256, 0, FrameFlags::NONE, Priority::Normal, Transport::None);
        let body = [0xFF, 0xFE];
        assert_eq!(Text256Packet::decode_body(&header, &body), Err(ProtoError::InvalidUtf8));
    }

    #[test]
    fn rejects_oversized_text() {
        let packet = Text256Packet::new(0, "a".repeat(Text256Packet::MAX_LEN + 1));
        let mut buf = Vec::new();
        assert_eq!(
            packet.serialize_into(&mut buf),
            Err(ProtoError::PayloadTooLarge { size: Text256Packet::MAX_LEN + 1, max: Text256Packet::MAX_LEN })
        );
    }
}

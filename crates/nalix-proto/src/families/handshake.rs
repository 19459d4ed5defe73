//! Opaque cryptographic handshake material (key shares, nonces, signed
//! challenges). The body is treated as an uninterpreted byte string here;
//! the crypto collaborator is responsible for its internal structure.

use bytes::{BufMut, Bytes};

use crate::{
    error::{ProtoError, Result},
    header::{FrameFlags, FrameMagic, PacketHeader, Priority, Transport},
    packet::PacketKind,
};

/// A frame carrying opaque handshake bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakePacket {
    /// Operation category within the Handshake family (e.g. offer vs. reply).
    pub op_code: u16,
    /// Processing flags (compression/encryption/signing).
    pub flags: FrameFlags,
    /// Delivery priority.
    pub priority: Priority,
    /// Destination transport.
    pub transport: Transport,
    /// Opaque material, never longer than [`Self::MAX_LEN`] bytes.
    pub payload: Bytes,
}

impl HandshakePacket {
    /// Largest handshake payload this family accepts, in bytes.
    pub const MAX_LEN: usize = 32;

    /// Build a new Handshake packet with default flags/priority/transport.
    #[must_use]
    pub fn new(op_code: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            op_code,
            flags: FrameFlags::NONE,
            priority: Priority::Urgent,
            transport: Transport::None,
            payload: payload.into(),
        }
    }
}

impl PacketKind for HandshakePacket {
    const MAGIC: FrameMagic = FrameMagic::HANDSHAKE;

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
        if body.len() > Self::MAX_LEN {
            return Err(ProtoError::PayloadTooLarge { size: body.len(), max: Self::MAX_LEN });
        }
        Ok(Self {
            op_code: header.op_code(),
            flags: header.flags(),
            priority: header.priority().unwrap_or(Priority::Urgent),
            transport: header.transport().unwrap_or(Transport::None),
            payload: Bytes::copy_from_slice(body),
        })
    }

    fn reset_for_pool(&mut self) {
        self.op_code = 0;
        self.flags = FrameFlags::NONE;
        self.priority = Priority::Urgent;
        self.transport = Transport::None;
        self.payload = Bytes::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let packet = HandshakePacket::new(1, Bytes::from_static(&[0xAB; 16]));
        let wire = packet.serialize();

        let header = PacketHeader::from_bytes(&wire).expect("header");
        let body = &wire[PacketHeader::SIZE..];
        let decoded = HandshakePacket::decode_body(header, body).expect("decode");

        assert_eq!(decoded.payload.len(), 16);
    }

    #[test]
    fn rejects_oversized_material() {
        let packet = HandshakePacket::new(0, Bytes::from(vec![0u8; HandshakePacket::MAX_LEN + 1]));
        let mut buf = Vec::new();
        assert_eq!(
            packet.serialize_into(&mut buf),
            Err(ProtoError::PayloadTooLarge {
                size: HandshakePacket::MAX_LEN + 1,
                max: HandshakePacket::MAX_LEN
            })
        );
    }
}

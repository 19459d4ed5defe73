//! The packet trait and the closed tagged union the registry dispatches to.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    error::{ProtoError, Result},
    families::{binary::BinaryPacket, control::ControlPacket, directive::DirectivePacket,
               handshake::HandshakePacket, text::Text256Packet},
    header::{FrameFlags, FrameMagic, PacketHeader, Priority, Transport},
};

/// Behaviour every concrete packet family implements.
///
/// `length()` and `serialize()`/`serialize_into()` must agree: the byte
/// count written by the latter equals the former, header included.
pub trait PacketKind: Sized {
    /// Frame family discriminator for this packet type.
    const MAGIC: FrameMagic;

    /// Operation code carried in this instance's header.
    fn op_code(&self) -> u16;

    /// Processing flags carried in this instance's header.
    fn flags(&self) -> FrameFlags;

    /// Delivery priority carried in this instance's header.
    fn priority(&self) -> Priority;

    /// Transport tag carried in this instance's header.
    fn transport(&self) -> Transport;

    /// Total serialized length, header included.
    fn length(&self) -> u16;

    /// Serialize header + body into a fresh buffer.
    fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.length() as usize);
        // `serialize_into` on a freshly-sized BytesMut cannot fail.
        let _ = self.serialize_into(&mut buf);
        buf.freeze()
    }

    /// Serialize header + body into the caller-provided buffer.
    fn serialize_into(&self, dst: &mut dyn BufMut) -> Result<()>;

    /// Parse an instance from a decoded body slice (header already consumed).
    fn decode_body(header: &PacketHeader, body: &[u8]) -> Result<Self>;

    /// Restore pool-default state before returning to the object pool.
    fn reset_for_pool(&mut self);

    /// Build this packet's header from its current fields.
    fn header(&self) -> PacketHeader {
        PacketHeader::new(Self::MAGIC, self.op_code(), self.flags(), self.priority(), self.transport())
    }
}

/// Dispatch-ready union of every registered packet family.
///
/// This is the "closed tagged union" the distilled spec's design notes
/// call for in place of interface dispatch: the registry resolves a
/// frame's magic to one of these variants without allocating a trait
/// object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyPacket {
    /// Raw binary payload.
    Binary(BinaryPacket),
    /// UTF-8 text payload, capped at 256 bytes.
    Text256(Text256Packet),
    /// Control-plane message (sequencing, keepalive, reason codes).
    Control(ControlPacket),
    /// Opaque cryptographic handshake material.
    Handshake(HandshakePacket),
    /// Compact server-to-client instruction.
    Directive(DirectivePacket),
}

impl AnyPacket {
    /// Frame family discriminator of the wrapped packet.
    #[must_use]
    pub const fn magic(&self) -> FrameMagic {
        match self {
            Self::Binary(_) => BinaryPacket::MAGIC,
            Self::Text256(_) => Text256Packet::MAGIC,
            Self::Control(_) => ControlPacket::MAGIC,
            Self::Handshake(_) => HandshakePacket::MAGIC,
            Self::Directive(_) => DirectivePacket::MAGIC,
        }
    }

    /// Serialize the wrapped packet to a fresh buffer.
    #[must_use]
    pub fn serialize(&self) -> Bytes {
        match self {
            Self::Binary(p) => p.serialize(),
            Self::Text256(p) => p.serialize(),
            Self::Control(p) => p.serialize(),
            Self::Handshake(p) => p.serialize(),
            Self::Directive(p) => p.serialize(),
        }
    }

    /// Total serialized length, header included.
    #[must_use]
    pub fn length(&self) -> u16 {
        match self {
            Self::Binary(p) => p.length(),
            Self::Text256(p) => p.length(),
            Self::Control(p) => p.length(),
            Self::Handshake(p) => p.length(),
            Self::Directive(p) => p.length(),
        }
    }

    /// Destination transport tag of the wrapped packet, used by the
    /// connection facade to pick between its TCP and UDP transports.
    #[must_use]
    pub fn transport(&self) -> Transport {
        match self {
            Self::Binary(p) => p.transport(),
            Self::Text256(p) => p.transport(),
            Self::Control(p) => p.transport(),
            Self::Handshake(p) => p.transport(),
            Self::Directive(p) => p.transport(),
        }
    }

    /// Restore pool-default state before returning to the object pool.
    pub fn reset_for_pool(&mut self) {
        match self {
            Self::Binary(p) => p.reset_for_pool(),
            Self::Text256(p) => p.reset_for_pool(),
            Self::Control(p) => p.reset_for_pool(),
            Self::Handshake(p) => p.reset_for_pool(),
            Self::Directive(p) => p.reset_for_pool(),
        }
    }

    /// Decode a frame whose magic has already been matched against one of
    /// the five built-in families.
    ///
    /// This is the fallback path the registry uses when no custom
    /// deserializer was registered for the magic; [`crate::registry`]
    /// (in `nalix-core`) wraps this behind its magic -> variant map.
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::UnknownMagic`] if `header`'s magic does not
    /// match any built-in family, or whatever error the matched family's
    /// [`PacketKind::decode_body`] returns.
    pub fn decode_builtin(header: &PacketHeader, body: &[u8]) -> Result<Self> {
        match header.magic() {
            m if m == BinaryPacket::MAGIC.value() => Ok(Self::Binary(BinaryPacket::decode_body(header, body)?)),
            m if m == Text256Packet::MAGIC.value() => {
                Ok(Self::Text256(Text256Packet::decode_body(header, body)?))
            }
            m if m == ControlPacket::MAGIC.value() => Ok(Self::Control(ControlPacket::decode_body(header, body)?)),
            m if m == HandshakePacket::MAGIC.value() => {
                Ok(Self::Handshake(HandshakePacket::decode_body(header, body)?))
            }
            m if m == DirectivePacket::MAGIC.value() => {
                Ok(Self::Directive(DirectivePacket::decode_body(header, body)?))
            }
            other => Err(ProtoError::UnknownMagic(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn decode_builtin_dispatches_by_magic() {
        let packet = AnyPacket::Binary(BinaryPacket::new(1, Bytes::from_static(b"x")));
        let wire = packet.serialize();
        let header = PacketHeader::from_bytes(&wire).expect("header");
        let body = &wire[PacketHeader::SIZE..];

        let decoded = AnyPacket::decode_builtin(header, body).expect("decode");
        assert_eq!(decoded, packet);
    }

    #[test]
    fn decode_builtin_rejects_unknown_magic() {
        let header = PacketHeader::new(
            FrameMagic(0xDEAD_BEEF),
            0,
            FrameFlags::NONE,
            Priority::Normal,
            Transport::None,
        );
        assert_eq!(AnyPacket::decode_builtin(&header, &[]), Err(ProtoError::UnknownMagic(0xDEAD_BEEF)));
    }
}

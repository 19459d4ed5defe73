//! Compact server-to-client instructions (disconnect, rekey, throttle...).
//!
//! Like [`crate::families::control`], the body is fixed-length so this
//! family never reports [`ProtoError::PayloadTooLarge`].

use bytes::{Buf, BufMut};

use crate::{
    error::{ProtoError, Result},
    header::{FrameFlags, FrameMagic, PacketHeader, Priority, Transport},
    packet::PacketKind,
};

/// Fixed body size: sequence_id(4) + type(1) + reason(1) + action(1)
/// + flags(1) + arg0(4) + arg1(4) + arg2(2).
const BODY_LEN: usize = 18;

/// A server-to-client directive frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectivePacket {
    /// Operation category within the Directive family.
    pub op_code: u16,
    /// Processing flags (compression/encryption/signing).
    pub flags: FrameFlags,
    /// Delivery priority.
    pub priority: Priority,
    /// Destination transport.
    pub transport: Transport,
    /// Sequence number this directive is ordered against.
    pub sequence_id: u32,
    /// Discriminator for the kind of directive.
    pub directive_type: u8,
    /// Application-defined reason code.
    pub reason: u8,
    /// Discriminator for the action the receiver should take.
    pub action: u8,
    /// Directive-specific bit flags, distinct from the frame's [`FrameFlags`].
    pub directive_flags: u8,
    /// First directive-specific argument.
    pub arg0: u32,
    /// Second directive-specific argument.
    pub arg1: u32,
    /// Third directive-specific argument.
    pub arg2: u16,
}

impl DirectivePacket {
    /// Build a new Directive packet with default flags/priority/transport.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        op_code: u16,
        sequence_id: u32,
        directive_type: u8,
        reason: u8,
        action: u8,
        directive_flags: u8,
        arg0: u32,
        arg1: u32,
        arg2: u16,
    ) -> Self {
        Self {
            op_code,
            flags: FrameFlags::NONE,
            priority: Priority::High,
            transport: Transport::None,
            sequence_id,
            directive_type,
            reason,
            action,
            directive_flags,
            arg0,
            arg1,
            arg2,
        }
    }
}

impl PacketKind for DirectivePacket {
    const MAGIC: FrameMagic = FrameMagic::DIRECTIVE;

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
        (PacketHeader::SIZE + BODY_LEN) as u16
    }

    fn serialize_into(&self, dst: &mut dyn BufMut) -> Result<()> {
        dst.put_slice(&self.header().to_bytes());
        dst.put_u32_le(self.sequence_id);
        dst.put_u8(self.directive_type);
        dst.put_u8(self.reason);
        dst.put_u8(self.action);
        dst.put_u8(self.directive_flags);
        dst.put_u32_le(self.arg0);
        dst.put_u32_le(self.arg1);
        dst.put_u16_le(self.arg2);
        Ok(())
    }

    fn decode_body(header: &PacketHeader, body: &[u8]) -> Result<Self> {
        if body.len() != BODY_LEN {
            return Err(ProtoError::FrameTruncated { expected: BODY_LEN, actual: body.len() });
        }
        let mut cursor = body;
        let sequence_id = cursor.get_u32_le();
        let directive_type = cursor.get_u8();
        let reason = cursor.get_u8();
        let action = cursor.get_u8();
        let directive_flags = cursor.get_u8();
        let arg0 = cursor.get_u32_le();
        let arg1 = cursor.get_u32_le();
        let arg2 = cursor.get_u16_le();

        Ok(Self {
            op_code: header.op_code(),
            flags: header.flags(),
            priority: header.priority().unwrap_or(Priority::High),
            transport: header.transport().unwrap_or(Transport::None),
            sequence_id,
            directive_type,
            reason,
            action,
            directive_flags,
            arg0,
            arg1,
            arg2,
        })
    }

    fn reset_for_pool(&mut self) {
        *self = Self {
            op_code: 0,
            flags: FrameFlags::NONE,
            priority: Priority::High,
            transport: Transport::None,
            sequence_id: 0,
            directive_type: 0,
            reason: 0,
            action: 0,
            directive_flags: 0,
            arg0: 0,
            arg1: 0,
            arg2: 0,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let packet = DirectivePacket::new(1, 7, 2, 0, 1, 0, 100, 200, 300);
        let wire = packet.serialize();
        assert_eq!(wire.len(), PacketHeader::SIZE + BODY_LEN);

        let header = PacketHeader::from_bytes(&wire).expect("header");
        let body = &wire[PacketHeader::SIZE..];
        let decoded = DirectivePacket::decode_body(header, body).expect("decode");

        assert_eq!(decoded.sequence_id, 7);
        assert_eq!(decoded.arg2, 300);
    }

    #[test]
    fn rejects_wrong_body_length() {
        let header =
            PacketHeader::new(FrameMagic::DIRECTIVE, 0, FrameFlags::NONE, Priority::High, Transport::None);
        let long = [0u8; BODY_LEN + 1];
        assert_eq!(
            DirectivePacket::decode_body(&header, &long),
            Err(ProtoError::FrameTruncated { expected: BODY_LEN, actual: BODY_LEN + 1 })
        );
    }
}

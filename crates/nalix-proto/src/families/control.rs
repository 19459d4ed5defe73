//! Control-plane messages: sequencing acks, keepalives and reason codes.
//!
//! The body is a fixed 23-byte record, never variable-length, so this
//! family never produces [`ProtoError::PayloadTooLarge`].

use bytes::{Buf, BufMut};

use crate::{
    error::{ProtoError, Result},
    header::{FrameFlags, FrameMagic, PacketHeader, Priority, Transport},
    packet::PacketKind,
};

/// Fixed body size: sequence_id(4) + reason_code(2) + control_type(1)
/// + unix_millis(8) + monotonic_ticks(8).
const BODY_LEN: usize = 23;

/// A control-plane frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlPacket {
    /// Operation category within the Control family.
    pub op_code: u16,
    /// Processing flags (compression/encryption/signing).
    pub flags: FrameFlags,
    /// Delivery priority.
    pub priority: Priority,
    /// Destination transport.
    pub transport: Transport,
    /// Monotonically increasing sequence number this message acks or carries.
    pub sequence_id: u32,
    /// Application-defined reason or status code.
    pub reason_code: u16,
    /// Discriminator for the kind of control event (ack, keepalive, close...).
    pub control_type: u8,
    /// Wall-clock timestamp, milliseconds since the Unix epoch.
    pub unix_millis: i64,
    /// Sender-local monotonic clock reading, for RTT/ordering estimation.
    pub monotonic_ticks: i64,
}

impl ControlPacket {
    /// Build a new Control packet with default flags/priority/transport.
    #[must_use]
    pub fn new(
        op_code: u16,
        sequence_id: u32,
        reason_code: u16,
        control_type: u8,
        unix_millis: i64,
        monotonic_ticks: i64,
    ) -> Self {
        Self {
            op_code,
            flags: FrameFlags::NONE,
            priority: Priority::High,
            transport: Transport::None,
            sequence_id,
            reason_code,
            control_type,
            unix_millis,
            monotonic_ticks,
        }
    }
}

impl PacketKind for ControlPacket {
    const MAGIC: FrameMagic = FrameMagic::CONTROL;

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
        dst.put_u16_le(self.reason_code);
        dst.put_u8(self.control_type);
        dst.put_i64_le(self.unix_millis);
        dst.put_i64_le(self.monotonic_ticks);
        Ok(())
    }

    fn decode_body(header: &PacketHeader, body: &[u8]) -> Result<Self> {
        if body.len() != BODY_LEN {
            return Err(ProtoError::FrameTruncated { expected: BODY_LEN, actual: body.len() });
        }
        let mut cursor = body;
        let sequence_id = cursor.get_u32_le();
        let reason_code = cursor.get_u16_le();
        let control_type = cursor.get_u8();
        let unix_millis = cursor.get_i64_le();
        let monotonic_ticks = cursor.get_i64_le();

        Ok(Self {
            op_code: header.op_code(),
            flags: header.flags(),
            priority: header.priority().unwrap_or(Priority::High),
            transport: header.transport().unwrap_or(Transport::None),
            sequence_id,
            reason_code,
            control_type,
            unix_millis,
            monotonic_ticks,
        })
    }

    fn reset_for_pool(&mut self) {
        *self = Self {
            op_code: 0,
            flags: FrameFlags::NONE,
            priority: Priority::High,
            transport: Transport::None,
            sequence_id: 0,
            reason_code: 0,
            control_type: 0,
            unix_millis: 0,
            monotonic_ticks: 0,
        };
    }
}

//! Length-prefixed framing on top of [`crate::header::PacketHeader`].
//!
//! Wire shape: a `u16` little-endian length, **inclusive of its own two
//! bytes**, followed by the `H`-byte header and the body. So
//! `length == 2 + H + body_len`, and `2 <= length <= MAX_FRAME`.

use bytes::{BufMut, Bytes};

use crate::{
    error::{ProtoError, Result},
    header::PacketHeader,
};

/// Bytes in the length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Largest value the length prefix may carry, matching the range of a
/// `u16` and the buffer pool's maximum size class.
pub const MAX_FRAME_SIZE: usize = u16::MAX as usize;

/// Smallest legal length prefix: the two prefix bytes plus a full header.
pub const MIN_FRAME_SIZE: usize = LENGTH_PREFIX_SIZE + PacketHeader::SIZE;

/// Write a length-prefixed frame: `len(2) || header(9) || body`, where
/// `len` counts itself, the header and the body.
///
/// # Errors
///
/// Returns [`ProtoError::FrameTooLarge`] if the resulting length value
/// would exceed [`MAX_FRAME_SIZE`].
pub fn write_prefixed(dst: &mut dyn BufMut, header: &PacketHeader, body: &[u8]) -> Result<()> {
    let length = LENGTH_PREFIX_SIZE + PacketHeader::SIZE + body.len();
    if length > MAX_FRAME_SIZE {
        return Err(ProtoError::FrameTooLarge { size: length, max: MAX_FRAME_SIZE });
    }
    dst.put_u16_le(length as u16);
    dst.put_slice(&header.to_bytes());
    dst.put_slice(body);
    Ok(())
}

/// Read the 2-byte length prefix from the front of `src`, without
/// consuming it from a caller-owned stream buffer (caller decides when
/// to advance past the prefix once it knows this much is available).
///
/// # Errors
///
/// Returns [`ProtoError::InvalidHeader`] if `src` holds fewer than
/// [`LENGTH_PREFIX_SIZE`] bytes, or if the decoded length is smaller
/// than [`MIN_FRAME_SIZE`] (a frame can never be shorter than its own
/// prefix and header combined).
pub fn read_length(src: &[u8]) -> Result<u16> {
    if src.len() < LENGTH_PREFIX_SIZE {
        return Err(ProtoError::InvalidHeader(src.len() as u16));
    }
    let len = u16::from_le_bytes([src[0], src[1]]);
    if (len as usize) < MIN_FRAME_SIZE {
        return Err(ProtoError::InvalidHeader(len));
    }
    Ok(len)
}

/// Parse the fixed header from the front of a frame body (length prefix
/// already stripped), returning the header and the remaining body slice.
///
/// # Errors
///
/// Returns [`ProtoError::FrameTruncated`] if `frame` holds fewer bytes
/// than the header alone requires.
pub fn parse_header(frame: &[u8]) -> Result<(&PacketHeader, &[u8])> {
    if frame.len() < PacketHeader::SIZE {
        return Err(ProtoError::FrameTruncated { expected: PacketHeader::SIZE, actual: frame.len() });
    }
    let header = PacketHeader::from_bytes(frame)?;
    Ok((header, &frame[PacketHeader::SIZE..]))
}

/// Decode one complete length-prefixed frame from the front of `src`.
///
/// Returns the parsed header, the body slice (borrowed from `src`) and
/// the number of bytes the whole frame (prefix included) occupied, so
/// the caller can advance its read cursor.
///
/// # Errors
///
/// Returns [`ProtoError::FrameTruncated`] if `src` does not yet hold a
/// complete frame; the caller should read more bytes and retry.
pub fn decode_frame(src: &[u8]) -> Result<(&PacketHeader, &[u8], usize)> {
    let length = read_length(src)? as usize;
    if src.len() < length {
        return Err(ProtoError::FrameTruncated { expected: length, actual: src.len() });
    }
    let (header, body) = parse_header(&src[LENGTH_PREFIX_SIZE..length])?;
    Ok((header, body, length))
}

/// Serialize header + body to a fresh length-prefixed [`Bytes`] buffer.
///
/// # Errors
///
/// See [`write_prefixed`].
pub fn encode_frame(header: &PacketHeader, body: &[u8]) -> Result<Bytes> {
    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + PacketHeader::SIZE + body.len());
    write_prefixed(&mut buf, header, body)?;
    Ok(Bytes::from(buf))
}

/// Peek the declared frame length (prefix included) without requiring
/// the header or body to be present yet. Convenience wrapper over
/// [`read_length`] for transports that track a running byte count.
#[must_use]
pub fn peek_frame_len(src: &[u8]) -> Option<u16> {
    read_length(src).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{FrameFlags, FrameMagic, Priority, Transport};

    #[test]
    fn encode_then_decode_round_trips() {
        let header =
            PacketHeader::new(FrameMagic::BINARY, 1, FrameFlags::NONE, Priority::Normal, Transport::Tcp);
        let body = b"payload";
        let framed = encode_frame(&header, body).expect("encode");

        let (decoded_header, decoded_body, consumed) = decode_frame(&framed).expect("decode");
        assert_eq!(consumed, framed.len());
        assert_eq!(decoded_header.magic(), FrameMagic::BINARY.value());
        assert_eq!(decoded_body, body);
    }

    #[test]
    fn length_prefix_counts_itself() {
        let header =
            PacketHeader::new(FrameMagic::BINARY, 1, FrameFlags::NONE, Priority::Normal, Transport::Tcp);
        let framed = encode_frame(&header, b"payload").expect("encode");
        let declared = u16::from_le_bytes([framed[0], framed[1]]) as usize;
        assert_eq!(declared, framed.len());
    }

    #[test]
    fn decode_reports_truncation() {
        let header =
            PacketHeader::new(FrameMagic::BINARY, 1, FrameFlags::NONE, Priority::Normal, Transport::Tcp);
        let framed = encode_frame(&header, b"payload").expect("encode");
        let partial = &framed[..framed.len() - 2];

        assert!(matches!(decode_frame(partial), Err(ProtoError::FrameTruncated { .. })));
    }

    #[test]
    fn read_length_rejects_prefix_shorter_than_header() {
        let mut buf = Vec::new();
        buf.put_u16_le(3); // smaller than MIN_FRAME_SIZE
        assert!(matches!(read_length(&buf), Err(ProtoError::InvalidHeader(3))));
    }

    #[test]
    fn rejects_oversized_frame() {
        let header =
            PacketHeader::new(FrameMagic::BINARY, 1, FrameFlags::NONE, Priority::Normal, Transport::Tcp);
        let body = vec![0u8; MAX_FRAME_SIZE];
        let mut buf = Vec::new();
        assert!(matches!(
            write_prefixed(&mut buf, &header, &body),
            Err(ProtoError::FrameTooLarge { .. })
        ));
    }

    proptest::proptest! {
        /// Any body within the legal size range survives `encode_frame` /
        /// `decode_frame` unchanged, and the declared length always
        /// matches the bytes actually produced.
        #[test]
        fn encode_decode_round_trips_for_any_legal_body(body in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..4096)) {
            let header =
                PacketHeader::new(FrameMagic::BINARY, 1, FrameFlags::NONE, Priority::Normal, Transport::Tcp);
            let framed = encode_frame(&header, &body).expect("body within range encodes");

            let (decoded_header, decoded_body, consumed) = decode_frame(&framed).expect("decode");
            proptest::prop_assert_eq!(consumed, framed.len());
            proptest::prop_assert_eq!(decoded_header.magic(), FrameMagic::BINARY.value());
            proptest::prop_assert_eq!(decoded_body, body.as_slice());
        }

        /// `read_length` never panics and always agrees with the prefix
        /// it was handed, for arbitrary byte strings of any length.
        #[test]
        fn read_length_never_panics(src in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..16)) {
            let _ = read_length(&src);
        }
    }
}

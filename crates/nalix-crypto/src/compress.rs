//! Body compression, backing the frame header's `COMPRESSED` flag.

use crate::error::{CryptoError, Result};

/// Default `zstd` compression level. Chosen for low latency on
/// small, frequent packet bodies rather than maximum ratio.
pub const DEFAULT_LEVEL: i32 = 3;

/// Compress `data` at [`DEFAULT_LEVEL`].
///
/// # Errors
///
/// Returns [`CryptoError::Compression`] if the underlying `zstd` call fails.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    compress_at_level(data, DEFAULT_LEVEL)
}

/// Compress `data` at the given `zstd` level.
///
/// # Errors
///
/// Returns [`CryptoError::Compression`] if the underlying `zstd` call fails.
pub fn compress_at_level(data: &[u8], level: i32) -> Result<Vec<u8>> {
    zstd::bulk::compress(data, level).map_err(|e| CryptoError::Compression(e.to_string()))
}

/// Decompress a buffer produced by [`compress`] or [`compress_at_level`].
///
/// # Errors
///
/// Returns [`CryptoError::Compression`] if the buffer is not valid `zstd`
/// or exceeds `max_decompressed_size`.
pub fn decompress(data: &[u8], max_decompressed_size: usize) -> Result<Vec<u8>> {
    zstd::bulk::decompress(data, max_decompressed_size).map_err(|e| CryptoError::Compression(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let original = b"nalix nalix nalix nalix nalix nalix".repeat(8);
        let compressed = compress(&original).expect("compress");
        let decompressed = decompress(&compressed, original.len() * 2).expect("decompress");
        assert_eq!(decompressed, original);
    }

    #[test]
    fn rejects_garbage_input() {
        assert!(decompress(&[0xDE, 0xAD, 0xBE, 0xEF], 1024).is_err());
    }
}

//! Errors produced by the cryptographic primitives.

use thiserror::Error;

/// Errors raised by AEAD, signing, key derivation or compression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// AEAD decryption failed authentication (tampered ciphertext, wrong
    /// key or nonce).
    #[error("AEAD authentication failed")]
    AeadAuthenticationFailed,

    /// A key or nonce was the wrong length for the requested algorithm.
    #[error("invalid key/nonce length: expected {expected}, got {got}")]
    InvalidLength {
        /// Bytes the algorithm requires.
        expected: usize,
        /// Bytes actually supplied.
        got: usize,
    },

    /// A ciphertext was shorter than the minimum overhead (nonce + tag).
    #[error("ciphertext too short: need at least {need} bytes, got {got}")]
    CiphertextTooShort {
        /// Minimum bytes required.
        need: usize,
        /// Bytes actually supplied.
        got: usize,
    },

    /// Ed25519 signature verification failed.
    #[error("signature verification failed")]
    SignatureInvalid,

    /// A signature or public key byte string had the wrong length.
    #[error("malformed signature material")]
    MalformedSignature,

    /// `zstd` failed to compress or decompress a buffer.
    #[error("compression failed: {0}")]
    Compression(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CryptoError>;

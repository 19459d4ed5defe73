//! ChaCha20-Poly1305 AEAD, the default symmetric algorithm for
//! [`nalix_core::SymmetricAlgorithm::ChaCha20Poly1305`].
//!
//! Wire shape produced by [`encrypt`]: `nonce(12) || ciphertext || tag(16)`.
//! The nonce is generated fresh per call and travels with the ciphertext
//! since the protocol carries the selected algorithm out-of-band but has
//! no dedicated nonce field.

use chacha20poly1305::{
    AeadCore, ChaCha20Poly1305, Key, KeyInit, Nonce,
    aead::{Aead, OsRng},
};

use crate::error::{CryptoError, Result};

/// Key length in bytes.
pub const KEY_LEN: usize = 32;
/// Nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// Poly1305 tag length in bytes, included in `ciphertext.len()`.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key`, returning `nonce || ciphertext || tag`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidLength`] if `key` is not [`KEY_LEN`] bytes.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::InvalidLength { expected: KEY_LEN, got: key.len() });
    }
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| CryptoError::AeadAuthenticationFailed)?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt a buffer produced by [`encrypt`] under the same `key`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidLength`] if `key` is not [`KEY_LEN`]
/// bytes, [`CryptoError::CiphertextTooShort`] if `sealed` is shorter than
/// `nonce + tag`, or [`CryptoError::AeadAuthenticationFailed`] if the tag
/// does not verify.
pub fn decrypt(key: &[u8], sealed: &[u8]) -> Result<Vec<u8>> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::InvalidLength { expected: KEY_LEN, got: key.len() });
    }
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::CiphertextTooShort { need: NONCE_LEN + TAG_LEN, got: sealed.len() });
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let nonce = Nonce::from_slice(nonce_bytes);
    cipher.decrypt(nonce, ciphertext).map_err(|_| CryptoError::AeadAuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let key = [0x42u8; KEY_LEN];
        let sealed = encrypt(&key, b"hello nalix").expect("encrypt");
        let opened = decrypt(&key, &sealed).expect("decrypt");
        assert_eq!(opened, b"hello nalix");
    }

    #[test]
    fn tamper_is_rejected() {
        let key = [0x11u8; KEY_LEN];
        let mut sealed = encrypt(&key, b"payload").expect("encrypt");
        let last = sealed.len() - 1;
        sealed[last] ^= 0xFF;
        assert_eq!(decrypt(&key, &sealed), Err(CryptoError::AeadAuthenticationFailed));
    }

    #[test]
    fn rejects_short_key() {
        assert_eq!(encrypt(&[0u8; 4], b"x"), Err(CryptoError::InvalidLength { expected: KEY_LEN, got: 4 }));
    }

    #[test]
    fn rejects_truncated_ciphertext() {
        let key = [0x5u8; KEY_LEN];
        assert!(matches!(decrypt(&key, &[0u8; 4]), Err(CryptoError::CiphertextTooShort { .. })));
    }
}

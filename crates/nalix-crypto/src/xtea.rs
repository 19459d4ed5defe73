//! XTEA, wrapped in a CTR-like keystream mode with an attached integrity
//! tag over caller-supplied associated data.
//!
//! XTEA is a 64-bit-block cipher with no standard AEAD construction, so
//! this module builds one: a keystream derived by encrypting an
//! incrementing counter block under the nonce, XORed with the plaintext,
//! followed by a keyed SHA-256 tag binding the ciphertext to the
//! caller's associated data (typically a packet's magic and op_code, see
//! the transformer pipeline in `nalix-net`). This is a legacy algorithm
//! kept for interoperability; prefer [`crate::chacha`] for new traffic.

use sha2::{Digest, Sha256};

use crate::error::{CryptoError, Result};

/// Key length in bytes (128-bit XTEA key).
pub const KEY_LEN: usize = 16;
/// Nonce length in bytes.
pub const NONCE_LEN: usize = 8;
/// Integrity tag length in bytes.
pub const TAG_LEN: usize = 16;

const ROUNDS: u32 = 32;
const DELTA: u32 = 0x9E37_79B9;

fn key_schedule(key: &[u8]) -> [u32; 4] {
    [
        u32::from_le_bytes([key[0], key[1], key[2], key[3]]),
        u32::from_le_bytes([key[4], key[5], key[6], key[7]]),
        u32::from_le_bytes([key[8], key[9], key[10], key[11]]),
        u32::from_le_bytes([key[12], key[13], key[14], key[15]]),
    ]
}

/// Encrypt one 64-bit block in place.
fn encrypt_block(key: &[u32; 4], v0: &mut u32, v1: &mut u32) {
    let mut sum: u32 = 0;
    for _ in 0..ROUNDS {
        *v0 = v0.wrapping_add(
            ((*v1 << 4) ^ (*v1 >> 5)).wrapping_add(*v1) ^ sum.wrapping_add(key[(sum & 3) as usize]),
        );
        sum = sum.wrapping_add(DELTA);
        *v1 = v1.wrapping_add(
            ((*v0 << 4) ^ (*v0 >> 5)).wrapping_add(*v0) ^ sum.wrapping_add(key[((sum >> 11) & 3) as usize]),
        );
    }
}

/// Derive a keystream of `len` bytes from `key`/`nonce` by encrypting
/// successive counter blocks, MSB-first.
fn keystream(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN], len: usize) -> Vec<u8> {
    let schedule = key_schedule(key);
    let mut out = Vec::with_capacity(len.next_multiple_of(8));
    let mut counter: u64 = 0;
    while out.len() < len {
        let mixed = u64::from_le_bytes(*nonce) ^ counter;
        let mut v0 = (mixed & 0xFFFF_FFFF) as u32;
        let mut v1 = (mixed >> 32) as u32;
        encrypt_block(&schedule, &mut v0, &mut v1);
        out.extend_from_slice(&v0.to_le_bytes());
        out.extend_from_slice(&v1.to_le_bytes());
        counter += 1;
    }
    out.truncate(len);
    out
}

fn tag_of(key: &[u8], associated_data: &[u8], nonce: &[u8], ciphertext: &[u8]) -> [u8; TAG_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(key);
    hasher.update(associated_data);
    hasher.update(nonce);
    hasher.update(ciphertext);
    let digest = hasher.finalize();
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&digest[..TAG_LEN]);
    tag
}

/// Encrypt `plaintext` under `key`, binding `associated_data` into the
/// trailing integrity tag. Returns `nonce(8) || ciphertext || tag(16)`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidLength`] if `key` is not [`KEY_LEN`] bytes.
pub fn encrypt(key: &[u8], associated_data: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::InvalidLength { expected: KEY_LEN, got: key.len() });
    }
    let key: [u8; KEY_LEN] = key.try_into().unwrap_or_else(|_| unreachable!());

    let mut nonce = [0u8; NONCE_LEN];
    getrandom::fill(&mut nonce).map_err(|_| CryptoError::Compression("RNG unavailable".to_string()))?;

    let stream = keystream(&key, &nonce, plaintext.len());
    let ciphertext: Vec<u8> = plaintext.iter().zip(stream.iter()).map(|(p, k)| p ^ k).collect();
    let tag = tag_of(&key, associated_data, &nonce, &ciphertext);

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len() + TAG_LEN);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    out.extend_from_slice(&tag);
    Ok(out)
}

/// Decrypt a buffer produced by [`encrypt`], checking the tag against the
/// same `associated_data` used at encryption time.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidLength`] if `key` is not [`KEY_LEN`]
/// bytes, [`CryptoError::CiphertextTooShort`] if `sealed` is shorter than
/// `nonce + tag`, or [`CryptoError::AeadAuthenticationFailed`] if the tag
/// does not match.
pub fn decrypt(key: &[u8], associated_data: &[u8], sealed: &[u8]) -> Result<Vec<u8>> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::InvalidLength { expected: KEY_LEN, got: key.len() });
    }
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::CiphertextTooShort { need: NONCE_LEN + TAG_LEN, got: sealed.len() });
    }
    let key: [u8; KEY_LEN] = key.try_into().unwrap_or_else(|_| unreachable!());

    let (nonce_bytes, rest) = sealed.split_at(NONCE_LEN);
    let (ciphertext, tag) = rest.split_at(rest.len() - TAG_LEN);
    let nonce: [u8; NONCE_LEN] = nonce_bytes.try_into().unwrap_or_else(|_| unreachable!());

    let expected_tag = tag_of(&key, associated_data, &nonce, ciphertext);
    if !constant_time_eq(&expected_tag, tag) {
        return Err(CryptoError::AeadAuthenticationFailed);
    }

    let stream = keystream(&key, &nonce, ciphertext.len());
    Ok(ciphertext.iter().zip(stream.iter()).map(|(c, k)| c ^ k).collect())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let key = [0x7Au8; KEY_LEN];
        let ad = b"magic+opcode";
        let sealed = encrypt(&key, ad, b"keep this secret").expect("encrypt");
        let opened = decrypt(&key, ad, &sealed).expect("decrypt");
        assert_eq!(opened, b"keep this secret");
    }

    #[test]
    fn wrong_associated_data_is_rejected() {
        let key = [0x7Au8; KEY_LEN];
        let sealed = encrypt(&key, b"correct-ad", b"payload").expect("encrypt");
        assert_eq!(decrypt(&key, b"wrong-ad", &sealed), Err(CryptoError::AeadAuthenticationFailed));
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let key = [0x01u8; KEY_LEN];
        let sealed = encrypt(&key, b"", b"").expect("encrypt");
        let opened = decrypt(&key, b"", &sealed).expect("decrypt");
        assert!(opened.is_empty());
    }
}

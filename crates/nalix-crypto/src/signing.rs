//! Ed25519 signing, backing the frame header's `SIGNED` flag.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::{CryptoError, Result};

/// Signature length in bytes.
pub const SIGNATURE_LEN: usize = 64;
/// Public key length in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Sign `message` with `signing_key`, returning the raw 64-byte signature.
#[must_use]
pub fn sign(signing_key: &SigningKey, message: &[u8]) -> [u8; SIGNATURE_LEN] {
    signing_key.sign(message).to_bytes()
}

/// Verify a raw 64-byte signature over `message` against `public_key`.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedSignature`] if `signature` is not
/// [`SIGNATURE_LEN`] bytes or `public_key` is not a valid Ed25519 point,
/// or [`CryptoError::SignatureInvalid`] if verification fails.
pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
    let public_key: [u8; PUBLIC_KEY_LEN] =
        public_key.try_into().map_err(|_| CryptoError::MalformedSignature)?;
    let verifying_key = VerifyingKey::from_bytes(&public_key).map_err(|_| CryptoError::MalformedSignature)?;

    let signature: [u8; SIGNATURE_LEN] =
        signature.try_into().map_err(|_| CryptoError::MalformedSignature)?;
    let signature = Signature::from_bytes(&signature);

    verifying_key.verify(message, &signature).map_err(|_| CryptoError::SignatureInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;

    fn fixed_key() -> SigningKey {
        SigningKey::from_bytes(&[0x5Au8; 32])
    }

    #[test]
    fn round_trip() {
        let signing_key = fixed_key();
        let verifying_key = signing_key.verifying_key();
        let signature = sign(&signing_key, b"a directive payload");

        verify(verifying_key.as_bytes(), b"a directive payload", &signature).expect("should verify");
    }

    #[test]
    fn tampered_message_fails() {
        let signing_key = fixed_key();
        let verifying_key = signing_key.verifying_key();
        let signature = sign(&signing_key, b"original");

        assert_eq!(
            verify(verifying_key.as_bytes(), b"tampered", &signature),
            Err(CryptoError::SignatureInvalid)
        );
    }

    #[test]
    fn malformed_signature_is_rejected() {
        let signing_key = fixed_key();
        let verifying_key = signing_key.verifying_key();
        assert_eq!(
            verify(verifying_key.as_bytes(), b"msg", &[0u8; 10]),
            Err(CryptoError::MalformedSignature)
        );
    }
}

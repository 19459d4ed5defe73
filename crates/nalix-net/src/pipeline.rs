//! Wires the crypto/compression collaborator into the packet registry's
//! transformer contract.
//!
//! Only the two raw-bytes families — [`BinaryPacket`] and
//! [`HandshakePacket`] — declare a transformer quartet. [`Text256Packet`]
//! holds a typed `String` body; compressing or encrypting it would
//! produce bytes no longer guaranteed valid UTF-8, so it is left out of
//! the pipeline, matching the "a type either exposes the full set or
//! none" rule. The pipeline itself (deciding when to call these) lives
//! outside the registry, in the connection facade or the caller.

use bytes::Bytes;

use nalix_core::{CoreError, PacketRegistry, Result, SymmetricAlgorithm, TransformerSet};
use nalix_proto::{
    AnyPacket, FrameFlags, FrameMagic, PacketKind,
    families::{binary::BinaryPacket, handshake::HandshakePacket},
};

/// Register the default compress/encrypt transformer quartets for the
/// families that declare them (Binary, Handshake).
///
/// # Errors
///
/// Returns [`CoreError::UnregisteredMagic`] if `registry` was not built
/// via [`PacketRegistry::bootstrap`] first.
pub fn register_default_transformers(registry: &mut PacketRegistry) -> Result<()> {
    registry.set_transformers(
        FrameMagic::BINARY,
        TransformerSet {
            compress: compress_binary,
            decompress: decompress_binary,
            encrypt: encrypt_binary,
            decrypt: decrypt_binary,
        },
    )?;
    registry.set_transformers(
        FrameMagic::HANDSHAKE,
        TransformerSet {
            compress: compress_handshake,
            decompress: decompress_handshake,
            encrypt: encrypt_handshake,
            decrypt: decrypt_handshake,
        },
    )?;
    Ok(())
}

fn transform_err(err: impl std::fmt::Display) -> CoreError {
    CoreError::TransformFailed(err.to_string())
}

fn compress_binary(pkt: AnyPacket) -> Result<AnyPacket> {
    let AnyPacket::Binary(mut p) = pkt else {
        return Err(transform_err("compress_binary called on a non-Binary packet"));
    };
    let compressed = nalix_crypto::compress::compress(&p.payload).map_err(transform_err)?;
    p.payload = Bytes::from(compressed);
    p.flags.insert(FrameFlags::COMPRESSED);
    Ok(AnyPacket::Binary(p))
}

fn decompress_binary(pkt: AnyPacket) -> Result<AnyPacket> {
    let AnyPacket::Binary(mut p) = pkt else {
        return Err(transform_err("decompress_binary called on a non-Binary packet"));
    };
    let decompressed =
        nalix_crypto::compress::decompress(&p.payload, nalix_proto::frame::MAX_FRAME_SIZE).map_err(transform_err)?;
    p.payload = Bytes::from(decompressed);
    p.flags.remove(FrameFlags::COMPRESSED);
    Ok(AnyPacket::Binary(p))
}

fn encrypt_binary(pkt: AnyPacket, key: &[u8], algo: SymmetricAlgorithm) -> Result<AnyPacket> {
    let AnyPacket::Binary(mut p) = pkt else {
        return Err(transform_err("encrypt_binary called on a non-Binary packet"));
    };
    let ad = associated_data(BinaryPacket::MAGIC.value(), p.op_code);
    p.payload = Bytes::from(seal(key, algo, &ad, &p.payload)?);
    p.flags.insert(FrameFlags::ENCRYPTED);
    Ok(AnyPacket::Binary(p))
}

fn decrypt_binary(pkt: AnyPacket, key: &[u8], algo: SymmetricAlgorithm) -> Result<AnyPacket> {
    let AnyPacket::Binary(mut p) = pkt else {
        return Err(transform_err("decrypt_binary called on a non-Binary packet"));
    };
    let ad = associated_data(BinaryPacket::MAGIC.value(), p.op_code);
    p.payload = Bytes::from(open(key, algo, &ad, &p.payload)?);
    p.flags.remove(FrameFlags::ENCRYPTED);
    Ok(AnyPacket::Binary(p))
}

fn compress_handshake(pkt: AnyPacket) -> Result<AnyPacket> {
    let AnyPacket::Handshake(mut p) = pkt else {
        return Err(transform_err("compress_handshake called on a non-Handshake packet"));
    };
    let compressed = nalix_crypto::compress::compress(&p.payload).map_err(transform_err)?;
    p.payload = Bytes::from(compressed);
    p.flags.insert(FrameFlags::COMPRESSED);
    Ok(AnyPacket::Handshake(p))
}

fn decompress_handshake(pkt: AnyPacket) -> Result<AnyPacket> {
    let AnyPacket::Handshake(mut p) = pkt else {
        return Err(transform_err("decompress_handshake called on a non-Handshake packet"));
    };
    let decompressed =
        nalix_crypto::compress::decompress(&p.payload, nalix_proto::frame::MAX_FRAME_SIZE).map_err(transform_err)?;
    p.payload = Bytes::from(decompressed);
    p.flags.remove(FrameFlags::COMPRESSED);
    Ok(AnyPacket::Handshake(p))
}

fn encrypt_handshake(pkt: AnyPacket, key: &[u8], algo: SymmetricAlgorithm) -> Result<AnyPacket> {
    let AnyPacket::Handshake(mut p) = pkt else {
        return Err(transform_err("encrypt_handshake called on a non-Handshake packet"));
    };
    let ad = associated_data(HandshakePacket::MAGIC.value(), p.op_code);
    p.payload = Bytes::from(seal(key, algo, &ad, &p.payload)?);
    p.flags.insert(FrameFlags::ENCRYPTED);
    Ok(AnyPacket::Handshake(p))
}

fn decrypt_handshake(pkt: AnyPacket, key: &[u8], algo: SymmetricAlgorithm) -> Result<AnyPacket> {
    let AnyPacket::Handshake(mut p) = pkt else {
        return Err(transform_err("decrypt_handshake called on a non-Handshake packet"));
    };
    let ad = associated_data(HandshakePacket::MAGIC.value(), p.op_code);
    p.payload = Bytes::from(open(key, algo, &ad, &p.payload)?);
    p.flags.remove(FrameFlags::ENCRYPTED);
    Ok(AnyPacket::Handshake(p))
}

fn associated_data(magic: u32, op_code: u16) -> [u8; 6] {
    let mut ad = [0u8; 6];
    ad[..4].copy_from_slice(&magic.to_le_bytes());
    ad[4..].copy_from_slice(&op_code.to_le_bytes());
    ad
}

fn seal(key: &[u8], algo: SymmetricAlgorithm, ad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    match algo {
        SymmetricAlgorithm::None => Ok(plaintext.to_vec()),
        SymmetricAlgorithm::ChaCha20Poly1305 => nalix_crypto::chacha::encrypt(key, plaintext).map_err(transform_err),
        SymmetricAlgorithm::Xtea => nalix_crypto::xtea::encrypt(key, ad, plaintext).map_err(transform_err),
    }
}

fn open(key: &[u8], algo: SymmetricAlgorithm, ad: &[u8], sealed: &[u8]) -> Result<Vec<u8>> {
    match algo {
        SymmetricAlgorithm::None => Ok(sealed.to_vec()),
        SymmetricAlgorithm::ChaCha20Poly1305 => nalix_crypto::chacha::decrypt(key, sealed).map_err(transform_err),
        SymmetricAlgorithm::Xtea => nalix_crypto::xtea::decrypt(key, ad, sealed).map_err(transform_err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalix_core::PacketRegistry;

    #[test]
    fn binary_compress_round_trips_and_flips_flag() {
        let mut registry = PacketRegistry::bootstrap().expect("bootstrap");
        register_default_transformers(&mut registry).expect("register");

        let packet = AnyPacket::Binary(BinaryPacket::new(1, Bytes::from_static(b"hello hello hello hello")));
        let set = registry.resolve_transformer(BinaryPacket::MAGIC.value()).expect("transformers registered");

        let compressed = (set.compress)(packet.clone()).expect("compress");
        let AnyPacket::Binary(ref c) = compressed else { unreachable!() };
        assert!(c.flags.contains(FrameFlags::COMPRESSED));

        let restored = (set.decompress)(compressed).expect("decompress");
        assert_eq!(restored, packet);
    }

    #[test]
    fn binary_chacha_round_trips_and_flips_flag() {
        let mut registry = PacketRegistry::bootstrap().expect("bootstrap");
        register_default_transformers(&mut registry).expect("register");

        let key = [7u8; 32];
        let packet = AnyPacket::Binary(BinaryPacket::new(2, Bytes::from_static(b"secret")));
        let set = registry.resolve_transformer(BinaryPacket::MAGIC.value()).expect("transformers registered");

        let sealed = (set.encrypt)(packet.clone(), &key, SymmetricAlgorithm::ChaCha20Poly1305).expect("encrypt");
        let AnyPacket::Binary(ref s) = sealed else { unreachable!() };
        assert!(s.flags.contains(FrameFlags::ENCRYPTED));
        assert_ne!(s.payload, Bytes::from_static(b"secret"));

        let opened = (set.decrypt)(sealed, &key, SymmetricAlgorithm::ChaCha20Poly1305).expect("decrypt");
        assert_eq!(opened, packet);
    }

    #[test]
    fn handshake_xtea_round_trips() {
        let mut registry = PacketRegistry::bootstrap().expect("bootstrap");
        register_default_transformers(&mut registry).expect("register");

        let key = [3u8; 16];
        let packet = AnyPacket::Handshake(HandshakePacket::new(1, Bytes::from_static(b"nonce-or-keyshare")));
        let set = registry.resolve_transformer(HandshakePacket::MAGIC.value()).expect("transformers registered");

        let sealed = (set.encrypt)(packet.clone(), &key, SymmetricAlgorithm::Xtea).expect("encrypt");
        let opened = (set.decrypt)(sealed, &key, SymmetricAlgorithm::Xtea).expect("decrypt");
        assert_eq!(opened, packet);
    }

    proptest::proptest! {
        /// For any Binary payload, compress then decompress is the
        /// identity and the round trip never panics.
        #[test]
        fn binary_compress_round_trips_for_any_payload(payload in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..2048)) {
            let mut registry = PacketRegistry::bootstrap().expect("bootstrap");
            register_default_transformers(&mut registry).expect("register");
            let set = registry.resolve_transformer(BinaryPacket::MAGIC.value()).expect("transformers registered");

            let packet = AnyPacket::Binary(BinaryPacket::new(1, Bytes::from(payload)));
            let compressed = (set.compress)(packet.clone()).expect("compress");
            let restored = (set.decompress)(compressed).expect("decompress");
            proptest::prop_assert_eq!(restored, packet);
        }

        /// For any key/plaintext pair, ChaCha20-Poly1305 seal then open
        /// recovers the original Binary packet.
        #[test]
        fn binary_chacha_round_trips_for_any_key_and_payload(
            key in proptest::collection::vec(proptest::prelude::any::<u8>(), 32..=32),
            payload in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..512),
        ) {
            let mut registry = PacketRegistry::bootstrap().expect("bootstrap");
            register_default_transformers(&mut registry).expect("register");
            let set = registry.resolve_transformer(BinaryPacket::MAGIC.value()).expect("transformers registered");

            let packet = AnyPacket::Binary(BinaryPacket::new(5, Bytes::from(payload)));
            let sealed = (set.encrypt)(packet.clone(), &key, SymmetricAlgorithm::ChaCha20Poly1305).expect("encrypt");
            let opened = (set.decrypt)(sealed, &key, SymmetricAlgorithm::ChaCha20Poly1305).expect("decrypt");
            proptest::prop_assert_eq!(opened, packet);
        }

        /// For any key/payload pair within the Handshake size cap, XTEA
        /// seal then open recovers the original packet.
        #[test]
        fn handshake_xtea_round_trips_for_any_key_and_payload(
            key in proptest::collection::vec(proptest::prelude::any::<u8>(), 16..=16),
            payload in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..=HandshakePacket::MAX_LEN),
        ) {
            let mut registry = PacketRegistry::bootstrap().expect("bootstrap");
            register_default_transformers(&mut registry).expect("register");
            let set = registry.resolve_transformer(HandshakePacket::MAGIC.value()).expect("transformers registered");

            let packet = AnyPacket::Handshake(HandshakePacket::new(2, Bytes::from(payload)));
            let sealed = (set.encrypt)(packet.clone(), &key, SymmetricAlgorithm::Xtea).expect("encrypt");
            let opened = (set.decrypt)(sealed, &key, SymmetricAlgorithm::Xtea).expect("decrypt");
            proptest::prop_assert_eq!(opened, packet);
        }
    }
}

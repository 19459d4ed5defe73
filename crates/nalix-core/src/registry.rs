//! Process-wide packet registry: magic -> decoder resolution and
//! type-keyed transformer delegates.
//!
//! Rust has no runtime reflection to "scan available packet types", so
//! the registry is built once by [`PacketRegistry::bootstrap`], a fixed
//! compile-time function that registers exactly the five built-in
//! families in a fixed order. It is read-only after construction.

use std::collections::HashMap;

use bytes::Bytes;
use nalix_proto::{AnyPacket, FrameMagic, PacketHeader, PacketVariant};
use tracing::{debug, error};

use crate::error::{CoreError, Result};

/// Symmetric algorithm selected per connection, carried out-of-band
/// (never on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SymmetricAlgorithm {
    /// No encryption in effect.
    #[default]
    None,
    /// AEAD via `ChaCha20Poly1305`.
    ChaCha20Poly1305,
    /// Legacy block cipher, keystream-wrapped.
    Xtea,
}

/// The four optional transformer delegates a packet family may declare.
///
/// A type either exposes the full quartet or none of it; there is no
/// partial registration.
pub struct TransformerSet {
    /// Compress the packet body, setting the `COMPRESSED` flag.
    pub compress: fn(AnyPacket) -> Result<AnyPacket>,
    /// Reverse [`Self::compress`], clearing the `COMPRESSED` flag.
    pub decompress: fn(AnyPacket) -> Result<AnyPacket>,
    /// Encrypt the packet body under `key`/`algo`, setting `ENCRYPTED`.
    pub encrypt: fn(AnyPacket, &[u8], SymmetricAlgorithm) -> Result<AnyPacket>,
    /// Reverse [`Self::encrypt`], clearing `ENCRYPTED`.
    pub decrypt: fn(AnyPacket, &[u8], SymmetricAlgorithm) -> Result<AnyPacket>,
}

type Deserializer = fn(&PacketHeader, &[u8]) -> nalix_proto::Result<AnyPacket>;

/// Registered information for one packet family.
struct Entry {
    variant: PacketVariant,
    decode: Deserializer,
    transformers: Option<TransformerSet>,
}

/// The process-wide, read-only-after-init packet registry.
pub struct PacketRegistry {
    by_magic: HashMap<u32, Entry>,
}

impl PacketRegistry {
    /// Register the five built-in families in a fixed order. Returns
    /// [`CoreError::DuplicateMagic`] if two registrations collide, which
    /// is a fatal, process-start-time error — there is no dynamic type
    /// discovery beyond this bootstrap.
    pub fn bootstrap() -> Result<Self> {
        let mut registry = Self { by_magic: HashMap::new() };

        registry.register(PacketVariant::Binary, FrameMagic::BINARY, AnyPacket::decode_builtin, None, "Binary")?;
        registry.register(PacketVariant::Text256, FrameMagic::TEXT_256, AnyPacket::decode_builtin, None, "Text256")?;
        registry.register(PacketVariant::Control, FrameMagic::CONTROL, AnyPacket::decode_builtin, None, "Control")?;
        registry.register(
            PacketVariant::Handshake,
            FrameMagic::HANDSHAKE,
            AnyPacket::decode_builtin,
            None,
            "Handshake",
        )?;
        registry.register(
            PacketVariant::Directive,
            FrameMagic::DIRECTIVE,
            AnyPacket::decode_builtin,
            None,
            "Directive",
        )?;

        debug!(families = registry.len(), "packet registry bootstrapped");
        Ok(registry)
    }

    fn register(
        &mut self,
        variant: PacketVariant,
        magic: FrameMagic,
        decode: Deserializer,
        transformers: Option<TransformerSet>,
        name: &'static str,
    ) -> Result<()> {
        if let Some(existing) = self.by_magic.get(&magic.value()) {
            let existing_name = existing_name(existing.variant);
            error!(magic = magic.value(), existing_name, name, "duplicate magic registration");
            return Err(CoreError::DuplicateMagic(magic.value(), existing_name, name));
        }
        self.by_magic.insert(magic.value(), Entry { variant, decode, transformers });
        Ok(())
    }

    /// Attach (or replace) the transformer quartet for a variant already
    /// present in the registry. Used by the crypto/compression
    /// collaborator to opt specific families into the transform pipeline
    /// after bootstrap; the registry itself never invokes these.
    pub fn set_transformers(&mut self, magic: FrameMagic, transformers: TransformerSet) -> Result<()> {
        let entry = self
            .by_magic
            .get_mut(&magic.value())
            .ok_or(CoreError::UnregisteredMagic(magic.value()))?;
        entry.transformers = Some(transformers);
        Ok(())
    }

    /// Resolve a deserializer for `header`'s magic and decode `body`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnregisteredMagic`] if no family claims this
    /// magic, or the family's own decode error otherwise.
    pub fn decode(&self, header: &PacketHeader, body: &Bytes) -> Result<AnyPacket> {
        let entry = self.by_magic.get(&header.magic()).ok_or(CoreError::UnregisteredMagic(header.magic()))?;
        Ok((entry.decode)(header, body)?)
    }

    /// Look up the transformer quartet registered for a magic, if any.
    #[must_use]
    pub fn resolve_transformer(&self, magic: u32) -> Option<&TransformerSet> {
        self.by_magic.get(&magic).and_then(|e| e.transformers.as_ref())
    }

    /// Number of registered families.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_magic.len()
    }

    /// Whether the registry has any registered families.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_magic.is_empty()
    }
}

fn existing_name(variant: PacketVariant) -> &'static str {
    match variant {
        PacketVariant::Binary => "Binary",
        PacketVariant::Text256 => "Text256",
        PacketVariant::Control => "Control",
        PacketVariant::Handshake => "Handshake",
        PacketVariant::Directive => "Directive",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalix_proto::{PacketKind, families::binary::BinaryPacket};

    #[test]
    fn bootstrap_registers_all_five_families() {
        let registry = PacketRegistry::bootstrap().expect("bootstrap");
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn decode_round_trips_through_registry() {
        let registry = PacketRegistry::bootstrap().expect("bootstrap");
        let packet = AnyPacket::Binary(BinaryPacket::new(1, Bytes::from_static(b"hi")));
        let wire = packet.serialize();

        let header = PacketHeader::from_bytes(&wire).expect("header");
        let body = Bytes::copy_from_slice(&wire[PacketHeader::SIZE..]);

        let decoded = registry.decode(header, &body).expect("decode");
        assert_eq!(decoded, packet);
    }

    #[test]
    fn decode_rejects_unregistered_magic() {
        let registry = PacketRegistry::bootstrap().expect("bootstrap");
        let header = PacketHeader::new(
            FrameMagic(0x1234_5678),
            0,
            nalix_proto::FrameFlags::NONE,
            nalix_proto::Priority::Normal,
            nalix_proto::Transport::None,
        );
        assert!(matches!(
            registry.decode(&header, &Bytes::new()),
            Err(CoreError::UnregisteredMagic(0x1234_5678))
        ));
    }

    #[test]
    fn duplicate_magic_registration_fails() {
        let mut registry = PacketRegistry { by_magic: HashMap::new() };
        registry
            .register(PacketVariant::Binary, FrameMagic::BINARY, AnyPacket::decode_builtin, None, "Binary")
            .expect("first registration succeeds");

        let err = registry
            .register(PacketVariant::Text256, FrameMagic::BINARY, AnyPacket::decode_builtin, None, "Text256")
            .expect_err("duplicate magic must fail");

        assert!(matches!(err, CoreError::DuplicateMagic(_, "Binary", "Text256")));
    }
}

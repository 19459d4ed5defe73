//! Concrete packet families registered with the packet registry.

pub mod binary;
pub mod control;
pub mod directive;
pub mod handshake;
pub mod text;

/// Which family an [`crate::packet::AnyPacket`] wraps.
///
/// Used as the key for the registry's type-keyed transformer map, since
/// Rust has no runtime `TypeId` lookup cheaper than this closed enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketVariant {
    /// [`binary::BinaryPacket`].
    Binary,
    /// [`text::Text256Packet`].
    Text256,
    /// [`control::ControlPacket`].
    Control,
    /// [`handshake::HandshakePacket`].
    Handshake,
    /// [`directive::DirectivePacket`].
    Directive,
}

//! Errors raised by pooling, registration and connection bookkeeping.

use thiserror::Error;

use nalix_proto::ProtoError;

/// Errors produced by the core crate: pools, the packet registry and the
/// (I/O-independent) connection state machine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Frame parsing or serialization failed.
    #[error(transparent)]
    Proto(#[from] ProtoError),

    /// Two families tried to register the same magic at bootstrap.
    #[error("duplicate packet magic {0:#010x} registered for both {1} and {2}")]
    DuplicateMagic(u32, &'static str, &'static str),

    /// The registry has no deserializer for the magic found on the wire.
    #[error("no registry entry for magic {0:#010x}")]
    UnregisteredMagic(u32),

    /// A pool's bounded queue is full and cannot accept another return.
    #[error("pool `{0}` is full; dropping returned item")]
    PoolFull(&'static str),

    /// The connection was asked to act after it had already closed.
    #[error("connection {0} is already closed")]
    ConnectionClosed(u64),

    /// A registered compress/decompress/encrypt/decrypt transformer
    /// failed. Carries the collaborator's own error message rather than
    /// a typed source, since this crate does not depend on whatever
    /// crate implements the transform (e.g. the crypto crate).
    #[error("packet transform failed: {0}")]
    TransformFailed(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CoreError>;

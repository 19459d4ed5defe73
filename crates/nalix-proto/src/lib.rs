//! Wire format and packet model for the Nalix messaging protocol.
//!
//! This crate owns everything that depends only on bytes: the fixed
//! [`header::PacketHeader`], length-prefixed [`frame`] codec, the five
//! built-in packet [`families`], and the [`packet::AnyPacket`] closed
//! union they compose into. It knows nothing about sockets, pools or
//! concurrency — see `nalix-core` and `nalix-net` for those.

pub mod error;
pub mod families;
pub mod frame;
pub mod header;
pub mod packet;

pub use error::{ProtoError, Result};
pub use families::PacketVariant;
pub use header::{FrameFlags, FrameMagic, PacketHeader, Priority, Transport};
pub use packet::{AnyPacket, PacketKind};

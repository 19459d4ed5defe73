//! Buffer and object pools, the packet registry and the clock
//! abstraction underpinning the Nalix messaging subsystem.
//!
//! This crate is I/O-free: it has no notion of a socket. `nalix-net`
//! builds the framed TCP/UDP transports and the connection facade on
//! top of the pools and registry defined here.

pub mod buffer_pool;
pub mod clock;
pub mod error;
pub mod object_pool;
pub mod registry;

pub use buffer_pool::BufferPool;
pub use clock::{Clock, SystemClock};
pub use error::{CoreError, Result};
pub use object_pool::{ObjectPool, Poolable};
pub use registry::{PacketRegistry, SymmetricAlgorithm, TransformerSet};

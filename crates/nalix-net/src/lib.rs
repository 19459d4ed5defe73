//! Framed TCP/UDP transport and the connection facade built on top of
//! `nalix-proto`'s wire format and `nalix-core`'s pools/registry.
//!
//! [`connection::Connection`] is the only type most callers touch
//! directly: it owns one accepted peer's TCP transport (and, once
//! negotiated, its UDP transport), drives the receive loop and forwards
//! delivered frames to a [`connection::Dispatcher`].

pub mod connection;
pub mod error;
pub mod pipeline;
pub mod tcp;
pub mod udp;

pub use connection::{AuthorityLevel, Connection, ConnectionHandle, ConnectionState, Dispatcher};
pub use error::{Result, TransportError};
pub use tcp::{DisconnectReason, TcpTransport};
pub use udp::UdpTransport;

//! Transport-level errors: everything that can go wrong moving frames
//! across a socket, as opposed to parsing them ([`nalix_proto::ProtoError`])
//! or pooling/registering them ([`nalix_core::CoreError`]).

use thiserror::Error;

use nalix_core::CoreError;
use nalix_proto::ProtoError;

/// Errors produced by the TCP/UDP transports and the connection facade.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Frame parsing, header or registry lookup failed.
    #[error(transparent)]
    Proto(#[from] ProtoError),

    /// Pooling or registry bookkeeping failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The underlying socket returned an I/O error outside the
    /// recognized close/reset cases below.
    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the connection mid-frame (zero-byte read after
    /// at least one byte of the frame had already arrived).
    #[error("peer closed connection mid-frame: expected {expected} bytes, got {got}")]
    IncompletePacket {
        /// Bytes the frame declared.
        expected: usize,
        /// Bytes actually received before the peer closed.
        got: usize,
    },

    /// The peer reset the connection (`ECONNRESET`) or otherwise aborted it.
    #[error("connection reset by peer")]
    SocketReset,

    /// The local operation was aborted, typically by cancellation.
    #[error("socket operation aborted")]
    SocketAborted,

    /// A send could not be completed, partially or fully. The caller
    /// observes this as a `false` return; the transport does not close
    /// the connection on this error by itself.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The transport was asked to act after it had already been disposed.
    #[error("transport has already been disposed")]
    Disposed,

    /// [`crate::tcp::TcpTransport::send`] was called with no Tokio
    /// runtime bound to the calling thread.
    #[error("no Tokio runtime bound to the calling thread")]
    NoRuntime,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TransportError>;

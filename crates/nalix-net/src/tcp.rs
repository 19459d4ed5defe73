//! Framed TCP transport: the receive-loop state machine, outbound
//! serialization and the cancellation wiring described in the
//! connection-oriented messaging subsystem's hardest subsystem.
//!
//! `Idle -> ReadingHeader -> ReadingBody -> Deliver -> Idle` (or
//! `Closing`), driven by [`run_receive_loop`]. A frame is never handed to
//! the incoming queue until all of its declared length has arrived;
//! partial reads simply loop back into the same state with an advanced
//! cursor.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::{Mutex, mpsc},
};
use tokio_util::sync::CancellationToken;

use nalix_core::BufferPool;
use nalix_proto::frame::{LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE, read_length};

use crate::error::{Result, TransportError};

/// Bodies shorter than this are framed on the stack; longer ones rent a
/// buffer from the pool. Chosen to keep small control/directive frames
/// off the allocator entirely.
const STACK_FRAME_THRESHOLD: usize = 512;

/// Why the receive loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The peer closed the socket cleanly (zero-byte read at a frame boundary).
    PeerClosed,
    /// The peer closed the socket mid-frame.
    Incomplete,
    /// The connection was reset or aborted by the peer or the OS.
    Reset,
    /// The caller's cancellation token fired.
    Cancelled,
    /// A framing error (bad length, oversized frame) forced disconnect.
    ProtocolError,
}

/// One live TCP connection's send half, shared between the receive task
/// and any caller wanting to send.
pub struct TcpTransport {
    writer: Mutex<OwnedWriteHalf>,
    peer_addr: std::net::SocketAddr,
}

impl TcpTransport {
    /// Split `stream` into a shareable transport and the read half the
    /// caller hands to [`run_receive_loop`].
    #[must_use]
    pub fn split(stream: TcpStream) -> (Arc<Self>, OwnedReadHalf) {
        let peer_addr = stream.peer_addr().unwrap_or_else(|_| ([0, 0, 0, 0], 0).into());
        let (read_half, write_half) = stream.into_split();
        (Arc::new(Self { writer: Mutex::new(write_half), peer_addr }), read_half)
    }

    /// Remote endpoint of this connection.
    #[must_use]
    pub fn peer_addr(&self) -> std::net::SocketAddr {
        self.peer_addr
    }

    /// Send `frame_payload` (a serialized packet: header + body, length
    /// prefix not yet applied) synchronously, blocking the calling thread
    /// on the Tokio runtime bound to it.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NoRuntime`] if no Tokio runtime is bound
    /// to the calling thread. See [`Self::send_async`] for the other
    /// error cases.
    ///
    /// # Panics
    ///
    /// This is a blocking call on an async runtime's handle, so it must
    /// only be invoked from a thread that is not itself driving that
    /// runtime's task scheduler — typically inside
    /// [`tokio::task::spawn_blocking`], never from within an `async fn`
    /// or `async` block polled on the same runtime. Calling it from such
    /// a task panics with "Cannot block the current thread from within a
    /// runtime"; no runtime API can detect that case ahead of time, so it
    /// cannot be converted into an error the way the no-runtime case
    /// below is.
    pub fn send(&self, frame_payload: &[u8]) -> Result<bool> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| TransportError::NoRuntime)?;
        handle.block_on(self.send_async(frame_payload, &CancellationToken::new()))
    }

    /// Send `frame_payload` asynchronously, observing `cancel`.
    ///
    /// Computes `total = frame_payload.len() + 2` and fails with a
    /// protocol-level `FrameTooLarge` if it would exceed `u16::MAX`.
    /// Partial writes are treated as a broken socket: logged and
    /// surfaced as `Ok(false)`, never retried inside the transport, and
    /// never implicitly closing the connection (that is the caller's
    /// call per the disconnect policy in `connection`).
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Proto`] if the frame would be too
    /// large, or [`TransportError::Io`] if the socket write fails outright.
    pub async fn send_async(&self, frame_payload: &[u8], cancel: &CancellationToken) -> Result<bool> {
        let total = frame_payload.len() + LENGTH_PREFIX_SIZE;
        if total > MAX_FRAME_SIZE {
            return Err(nalix_proto::ProtoError::FrameTooLarge { size: total, max: MAX_FRAME_SIZE }.into());
        }

        let mut framed: [u8; STACK_FRAME_THRESHOLD] = [0; STACK_FRAME_THRESHOLD];
        let owned;
        let out: &[u8] = if total <= STACK_FRAME_THRESHOLD {
            framed[..LENGTH_PREFIX_SIZE].copy_from_slice(&(total as u16).to_le_bytes());
            framed[LENGTH_PREFIX_SIZE..total].copy_from_slice(frame_payload);
            &framed[..total]
        } else {
            let mut buf = BytesMut::with_capacity(total);
            buf.extend_from_slice(&(total as u16).to_le_bytes());
            buf.extend_from_slice(frame_payload);
            owned = buf.freeze();
            &owned
        };

        let mut writer = self.writer.lock().await;
        let write = writer.write_all(out);
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(peer = %self.peer_addr, "send cancelled");
                Ok(false)
            }
            result = write => match result {
                Ok(()) => Ok(true),
                Err(err) => {
                    tracing::warn!(peer = %self.peer_addr, error = %err, "send failed");
                    Ok(false)
                }
            },
        }
    }

    /// Gracefully close the write half, signalling end-of-stream to the peer.
    pub async fn shutdown(&self) {
        let mut writer = self.writer.lock().await;
        let _ = writer.shutdown().await;
    }
}

/// Drive the receive state machine for one connection until the peer
/// closes, an unrecoverable error occurs, or `cancel` fires.
///
/// Delivered frame bodies (header included, length prefix stripped) are
/// pushed onto `incoming`; the caller (the connection facade) is
/// responsible for updating `last_ping_time` and dispatching each frame,
/// keeping this loop free of anything but the bytes-on-the-wire contract.
pub async fn run_receive_loop(
    mut reader: OwnedReadHalf,
    pool: Arc<BufferPool>,
    max_buffer: usize,
    incoming: mpsc::Sender<Bytes>,
    cancel: CancellationToken,
) -> DisconnectReason {
    let mut working = pool.rent(LENGTH_PREFIX_SIZE);

    loop {
        working.clear();
        working.resize(LENGTH_PREFIX_SIZE, 0);

        match read_exact_cancellable(&mut reader, &mut working, &cancel).await {
            ReadOutcome::Cancelled => return DisconnectReason::Cancelled,
            ReadOutcome::Closed => return DisconnectReason::PeerClosed,
            ReadOutcome::Reset => return DisconnectReason::Reset,
            ReadOutcome::Ok => {}
        }

        let length = match read_length(&working) {
            Ok(length) => length as usize,
            Err(err) => {
                tracing::warn!(error = %err, "invalid frame length prefix, dropping connection");
                return DisconnectReason::ProtocolError;
            }
        };

        if length > max_buffer {
            tracing::warn!(length, max_buffer, "frame exceeds maximum buffer size, dropping connection");
            return DisconnectReason::ProtocolError;
        }

        if working.capacity() < length {
            let mut bigger = pool.rent(length);
            bigger.extend_from_slice(&working[..LENGTH_PREFIX_SIZE]);
            pool.release(std::mem::replace(&mut working, bigger));
        }
        working.resize(length, 0);

        match read_exact_cancellable(&mut reader, &mut working[LENGTH_PREFIX_SIZE..], &cancel).await {
            ReadOutcome::Cancelled => return DisconnectReason::Cancelled,
            ReadOutcome::Closed | ReadOutcome::Reset => {
                tracing::warn!(length, "peer closed mid-frame");
                return DisconnectReason::Incomplete;
            }
            ReadOutcome::Ok => {}
        }

        let body = Bytes::copy_from_slice(&working[LENGTH_PREFIX_SIZE..length]);
        if incoming.send(body).await.is_err() {
            // Receiver side (the connection facade) has gone away.
            return DisconnectReason::Cancelled;
        }
    }
}

enum ReadOutcome {
    Ok,
    Closed,
    Reset,
    Cancelled,
}

/// Read exactly `dst.len()` bytes, filling incrementally across however
/// many socket reads it takes, racing each individual read against
/// `cancel` so a cancellation unblocks a stalled peer instead of waiting
/// indefinitely on the next byte.
async fn read_exact_cancellable(reader: &mut OwnedReadHalf, dst: &mut [u8], cancel: &CancellationToken) -> ReadOutcome {
    let mut offset = 0;
    while offset < dst.len() {
        let read = reader.read(&mut dst[offset..]);
        tokio::select! {
            biased;
            () = cancel.cancelled() => return ReadOutcome::Cancelled,
            result = read => match result {
                Ok(0) => return ReadOutcome::Closed,
                Ok(n) => offset += n,
                Err(err) if is_reset(&err) => return ReadOutcome::Reset,
                Err(err) => {
                    tracing::warn!(error = %err, "receive failed");
                    return ReadOutcome::Reset;
                }
            },
        }
    }
    ReadOutcome::Ok
}

fn is_reset(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionAborted
    )
}

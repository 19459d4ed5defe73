//! Connection facade: glues the TCP and UDP transports, the packet
//! registry and the object/buffer pools into one per-connection handle,
//! and forwards delivered frames to a [`Dispatcher`] collaborator.

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicI64, Ordering},
    },
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use bytes::Bytes;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_util::sync::CancellationToken;
use zeroize::Zeroizing;

use nalix_core::{BufferPool, PacketRegistry, SymmetricAlgorithm};
use nalix_proto::{AnyPacket, Transport};

use crate::{
    error::Result,
    tcp::{self, DisconnectReason, TcpTransport},
    udp::UdpTransport,
};

/// Depth of the bounded incoming-frame queue.
pub const DEFAULT_INCOMING_CAPACITY: usize = 256;

/// Collaborator the connection facade hands delivered frames to.
///
/// Routing/handler-resolution is explicitly out of scope here (the
/// dispatcher's own contract); this trait is only the seam. `on_frame`
/// corresponds to the distilled design's "on_process" event, raised once
/// per frame in arrival order; `on_post_process` and `on_close` are the
/// facade's two other lifecycle events.
pub trait Dispatcher: Send + Sync {
    /// Raised once per delivered frame. `frame` is the header followed by
    /// the body, with only the 2-byte length prefix stripped; parsing the
    /// header and resolving a decoder is up to the implementation, via
    /// the registry the connection was constructed with
    /// ([`ConnectionHandle::registry`]).
    fn on_frame(&self, conn: &ConnectionHandle, frame: Bytes);

    /// Raised after a `send` that went out over TCP completes successfully.
    fn on_post_process(&self, _conn: &ConnectionHandle) {}

    /// Raised exactly once, when the connection transitions to `Closed`.
    fn on_close(&self, _conn: &ConnectionHandle, _reason: DisconnectReason) {}
}

/// Authority level granted to a connection after handshake/authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AuthorityLevel {
    /// Not yet authenticated.
    #[default]
    Guest,
    /// Ordinary authenticated user.
    User,
    /// Elevated operator/administrator privileges.
    Admin,
}

/// Lifecycle state of a [`Connection`]. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Accepted, receive loop running.
    Open,
    /// Disconnect in progress; sends may still be attempted but will
    /// likely fail as the transports wind down.
    Closing,
    /// Terminal.
    Closed,
}

/// Out-of-band security context threaded through a connection: the
/// negotiated symmetric key/algorithm and authorization level. Never
/// serialized on the wire.
///
/// `encryption_key` is zeroized on drop and on every replacement, so a
/// negotiated key never lingers in memory past the connection (or
/// handshake) that installed it.
#[derive(Default)]
struct SecurityState {
    encryption_key: Option<Zeroizing<Vec<u8>>>,
    authority: AuthorityLevel,
    selected_algo: SymmetricAlgorithm,
}

/// Per-connection state and the glue between its two transports.
pub struct Connection {
    id: u64,
    remote_addr: SocketAddr,
    created_at: Instant,
    last_ping_ms: AtomicI64,
    state: std::sync::Mutex<ConnectionState>,
    keep_reading: AtomicBool,
    disconnected_fired: AtomicBool,

    tcp: Arc<TcpTransport>,
    udp: std::sync::Mutex<Option<Arc<UdpTransport>>>,

    registry: Arc<PacketRegistry>,
    buffer_pool: Arc<BufferPool>,

    cancellation: CancellationToken,
    dispatcher: Arc<dyn Dispatcher>,

    security: std::sync::Mutex<SecurityState>,
}

/// Shared, cloneable handle to a live connection — the type
/// [`Dispatcher`] implementations receive so they can reply or inspect
/// state without owning the connection outright.
#[derive(Clone)]
pub struct ConnectionHandle(Arc<Connection>);

impl std::ops::Deref for ConnectionHandle {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.0
    }
}

impl Connection {
    /// Accept a freshly-connected TCP stream as connection `id`, spawning
    /// its receive loop and an internal drain task that calls `dispatcher`
    /// for each delivered frame. `external_cancel` is linked into a child
    /// token so cancelling it (or calling [`Connection::disconnect`])
    /// unblocks the pending receive.
    #[must_use]
    pub fn accept(
        id: u64,
        stream: TcpStream,
        udp: Option<UdpTransport>,
        registry: Arc<PacketRegistry>,
        buffer_pool: Arc<BufferPool>,
        dispatcher: Arc<dyn Dispatcher>,
        external_cancel: &CancellationToken,
        max_buffer: usize,
    ) -> ConnectionHandle {
        let (tcp, read_half) = TcpTransport::split(stream);
        let remote_addr = tcp.peer_addr();
        let cancellation = external_cancel.child_token();

        let connection = Arc::new(Connection {
            id,
            remote_addr,
            created_at: Instant::now(),
            last_ping_ms: AtomicI64::new(0),
            state: std::sync::Mutex::new(ConnectionState::Open),
            keep_reading: AtomicBool::new(true),
            disconnected_fired: AtomicBool::new(false),
            tcp,
            udp: std::sync::Mutex::new(udp.map(Arc::new)),
            registry,
            buffer_pool: buffer_pool.clone(),
            cancellation: cancellation.clone(),
            dispatcher,
            security: std::sync::Mutex::new(SecurityState::default()),
        });
        let handle = ConnectionHandle(connection);

        let (tx, rx) = mpsc::channel(DEFAULT_INCOMING_CAPACITY);
        let receive_task =
            tokio::spawn(tcp::run_receive_loop(read_half, buffer_pool, max_buffer, tx, cancellation));

        tokio::spawn(drain_incoming(handle.clone(), rx));
        tokio::spawn(await_disconnect(handle.clone(), receive_task));

        handle
    }

    /// Opaque connection identifier.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remote TCP endpoint.
    #[must_use]
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Milliseconds since this connection was accepted.
    #[must_use]
    pub fn uptime_ms(&self) -> u64 {
        self.created_at.elapsed().as_millis() as u64
    }

    /// Milliseconds since the last successfully received full frame, or
    /// `u64::MAX` if none has arrived yet.
    #[must_use]
    pub fn idle_ms(&self) -> u64 {
        let last = self.last_ping_ms.load(Ordering::Acquire);
        if last == 0 {
            return u64::MAX;
        }
        (now_unix_millis() - last).max(0) as u64
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The registry this connection decodes/encodes packets with.
    #[must_use]
    pub fn registry(&self) -> &PacketRegistry {
        &self.registry
    }

    /// Install the negotiated symmetric key and algorithm after a
    /// handshake completes.
    pub fn set_security(&self, key: Vec<u8>, algo: SymmetricAlgorithm, authority: AuthorityLevel) {
        let mut security = self.security.lock().unwrap_or_else(|e| e.into_inner());
        security.encryption_key = Some(Zeroizing::new(key));
        security.selected_algo = algo;
        security.authority = authority;
    }

    /// The negotiated symmetric algorithm, `None` until a handshake sets one.
    #[must_use]
    pub fn selected_algorithm(&self) -> SymmetricAlgorithm {
        self.security.lock().unwrap_or_else(|e| e.into_inner()).selected_algo
    }

    /// The connection's authorization level.
    #[must_use]
    pub fn authority(&self) -> AuthorityLevel {
        self.security.lock().unwrap_or_else(|e| e.into_inner()).authority
    }

    /// Install or replace the bound UDP transport (e.g. after an address
    /// family change forces a rebind upstream).
    pub fn set_udp(&self, udp: Option<UdpTransport>) {
        *self.udp.lock().unwrap_or_else(|e| e.into_inner()) = udp.map(Arc::new);
    }

    /// The buffer pool this connection's receive loop rents from.
    #[must_use]
    pub fn buffer_pool(&self) -> &Arc<BufferPool> {
        &self.buffer_pool
    }

    fn note_frame_received(&self) {
        self.last_ping_ms.store(now_unix_millis(), Ordering::Release);
    }
}

impl ConnectionHandle {
    /// Serialize and send `packet`, see [`Connection::send`].
    ///
    /// # Errors
    ///
    /// See [`Connection::send`].
    pub async fn send(&self, packet: &AnyPacket) -> Result<bool> {
        let payload = packet.serialize();
        match packet.transport() {
            Transport::Udp => {
                let udp = self.udp.lock().unwrap_or_else(|e| e.into_inner()).clone();
                match udp {
                    Some(udp) => udp.send(&payload).await,
                    None => Ok(false),
                }
            }
            Transport::Tcp | Transport::None => {
                let sent = self.tcp.send_async(&payload, &self.cancellation).await?;
                if sent {
                    self.dispatcher.on_post_process(self);
                }
                Ok(sent)
            }
        }
    }

    /// Idempotently tear down the connection, see [`Connection::disconnect`].
    pub async fn disconnect(&self, reason: DisconnectReason) {
        if self.keep_reading.compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return;
        }
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = ConnectionState::Closing;
        self.cancellation.cancel();
        self.tcp.shutdown().await;

        if self.disconnected_fired.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok() {
            *self.state.lock().unwrap_or_else(|e| e.into_inner()) = ConnectionState::Closed;
            self.dispatcher.on_close(self, reason);
        }
    }
}

async fn drain_incoming(conn: ConnectionHandle, mut rx: mpsc::Receiver<Bytes>) {
    while let Some(frame) = rx.recv().await {
        conn.note_frame_received();
        conn.dispatcher.on_frame(&conn, frame);
    }
}

async fn await_disconnect(conn: ConnectionHandle, receive_task: tokio::task::JoinHandle<DisconnectReason>) {
    let reason = receive_task.await.unwrap_or(DisconnectReason::Reset);
    conn.disconnect(reason).await;
}

fn now_unix_millis() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as i64).unwrap_or(0)
}

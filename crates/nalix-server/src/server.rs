//! TCP accept loop: the "Z" server shell component. Binds one listener,
//! bootstraps the shared registry/pools once, and spawns a
//! [`nalix_net::Connection`] per accepted peer.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use nalix_core::{BufferPool, CoreError, PacketRegistry};
use nalix_net::{Connection, Dispatcher};

use crate::config::ServerConfig;

/// Errors starting or running the server shell.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding the TCP listener failed.
    #[error("failed to bind {0}: {1}")]
    Bind(std::net::SocketAddr, std::io::Error),

    /// The accept loop itself failed outright (not a per-connection error).
    #[error("accept loop failed: {0}")]
    Accept(std::io::Error),

    /// Bootstrapping the packet registry failed (duplicate magic).
    #[error(transparent)]
    Registry(#[from] CoreError),
}

/// A bound, not-yet-running Nalix server.
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    registry: Arc<PacketRegistry>,
    buffer_pool: Arc<BufferPool>,
    cancellation: CancellationToken,
    next_id: AtomicU64,
}

impl Server {
    /// Bind the TCP listener and bootstrap the shared registry/pools.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the listen address is in use or
    /// otherwise unavailable, or [`ServerError::Registry`] if bootstrap
    /// somehow registers a duplicate magic (this cannot happen with the
    /// five built-in families, but the error is not silently discarded).
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener =
            TcpListener::bind(config.bind).await.map_err(|err| ServerError::Bind(config.bind, err))?;

        let mut registry = PacketRegistry::bootstrap()?;
        nalix_net::pipeline::register_default_transformers(&mut registry)?;

        let buffer_pool =
            BufferPool::new(config.min_buffer_class, config.max_buffer_class, config.buffer_class_capacity);

        Ok(Self {
            listener,
            config,
            registry: Arc::new(registry),
            buffer_pool: Arc::new(buffer_pool),
            cancellation: CancellationToken::new(),
            next_id: AtomicU64::new(1),
        })
    }

    /// The address actually bound (useful when `--bind` used port 0).
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the underlying socket cannot report its
    /// local address.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// A token whose cancellation unblocks the accept loop and every
    /// connection descended from it.
    #[must_use]
    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Accept connections until `self.cancellation()` fires, handing
    /// each one to `dispatcher`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Accept`] if the listener itself fails
    /// (not a per-connection error, which is only logged).
    pub async fn run(self, dispatcher: Arc<dyn Dispatcher>) -> Result<(), ServerError> {
        let max_buffer = self.config.max_buffer_class;

        loop {
            tokio::select! {
                biased;
                () = self.cancellation.cancelled() => {
                    tracing::info!("server shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = accepted.map_err(ServerError::Accept)?;
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    tracing::info!(id, %peer, "accepted connection");

                    let udp = if self.config.enable_udp {
                        match nalix_net::UdpTransport::connect(peer).await {
                            Ok(udp) => Some(udp),
                            Err(err) => {
                                tracing::warn!(id, %peer, error = %err, "failed to open UDP transport");
                                None
                            }
                        }
                    } else {
                        None
                    };

                    let _handle = Connection::accept(
                        id,
                        stream,
                        udp,
                        self.registry.clone(),
                        self.buffer_pool.clone(),
                        dispatcher.clone(),
                        &self.cancellation,
                        max_buffer,
                    );
                }
            }
        }
    }
}

//! UDP datagram transport sharing the TCP transport's length-prefixed
//! serialization contract. Bound to a single remote peer via
//! connect-on-UDP semantics for convenience; receive is not part of the
//! core (see the distilled spec's Non-goals).

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::{net::UdpSocket, sync::Mutex};

use nalix_proto::frame::{LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE};

use crate::error::Result;

/// A UDP socket fixed to one remote peer.
pub struct UdpTransport {
    socket: Mutex<UdpSocket>,
    remote: SocketAddr,
}

impl UdpTransport {
    /// Bind a local socket matching `remote`'s address family and
    /// connect it, so subsequent `send`s need not repeat the destination.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TransportError::Io`] if binding or connecting fails.
    pub async fn connect(remote: SocketAddr) -> Result<Self> {
        let local = if remote.is_ipv6() {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0)
        } else {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(remote).await?;
        Ok(Self { socket: Mutex::new(socket), remote })
    }

    /// The peer this transport is bound to.
    #[must_use]
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// Rebuild the underlying socket if `new_remote`'s address family
    /// differs from the one currently bound (IPv4 vs. IPv6). A same-family
    /// change just updates the connected peer in place.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TransportError::Io`] if the rebuild fails.
    pub async fn reconcile_peer(&mut self, new_remote: SocketAddr) -> Result<()> {
        if new_remote.is_ipv6() == self.remote.is_ipv6() {
            self.socket.get_mut().connect(new_remote).await?;
            self.remote = new_remote;
            return Ok(());
        }

        tracing::info!(old = %self.remote, new = %new_remote, "UDP address family changed, rebinding socket");
        let rebuilt = Self::connect(new_remote).await?;
        *self = rebuilt;
        Ok(())
    }

    /// Send one length-prefixed datagram. A partial send (fewer bytes
    /// accepted by the OS than the datagram's length) is treated as a
    /// failure, surfaced as `Ok(false)`, matching the TCP transport's
    /// send-failure contract.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TransportError::Proto`] if the framed size would
    /// exceed `u16::MAX`, or [`crate::TransportError::Io`] if the socket
    /// send itself errors outright.
    pub async fn send(&self, frame_payload: &[u8]) -> Result<bool> {
        let total = frame_payload.len() + LENGTH_PREFIX_SIZE;
        if total > MAX_FRAME_SIZE {
            return Err(nalix_proto::ProtoError::FrameTooLarge { size: total, max: MAX_FRAME_SIZE }.into());
        }

        let mut datagram = Vec::with_capacity(total);
        datagram.extend_from_slice(&(total as u16).to_le_bytes());
        datagram.extend_from_slice(frame_payload);

        let socket = self.socket.lock().await;
        match socket.send(&datagram).await {
            Ok(sent) if sent == datagram.len() => Ok(true),
            Ok(sent) => {
                tracing::warn!(sent, expected = datagram.len(), "partial UDP send");
                Ok(false)
            }
            Err(err) => {
                tracing::warn!(error = %err, "UDP send failed");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalix_proto::{PacketKind, families::binary::BinaryPacket};

    #[tokio::test]
    async fn round_trip_datagram() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.expect("bind receiver");
        let receiver_addr = receiver.local_addr().expect("addr");

        let transport = UdpTransport::connect(receiver_addr).await.expect("connect");
        let packet = BinaryPacket::new(1, bytes::Bytes::from_static(b"udp"));
        let wire = packet.serialize();

        assert!(transport.send(&wire).await.expect("send"));

        let mut buf = [0u8; 256];
        let (n, _from) = receiver.recv_from(&mut buf).await.expect("recv");
        let total = u16::from_le_bytes([buf[0], buf[1]]) as usize;
        assert_eq!(total, n);
        assert_eq!(&buf[2..n], &wire[..]);
    }

    #[tokio::test]
    async fn rejects_oversized_datagram() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.expect("bind receiver");
        let addr = receiver.local_addr().expect("addr");
        let transport = UdpTransport::connect(addr).await.expect("connect");

        let oversized = vec![0u8; MAX_FRAME_SIZE];
        assert!(transport.send(&oversized).await.is_err());
    }

    #[tokio::test]
    async fn reconcile_same_family_updates_peer() {
        let first = UdpSocket::bind("127.0.0.1:0").await.expect("bind");
        let second = UdpSocket::bind("127.0.0.1:0").await.expect("bind");
        let mut transport = UdpTransport::connect(first.local_addr().unwrap()).await.expect("connect");

        transport.reconcile_peer(second.local_addr().unwrap()).await.expect("reconcile");
        assert_eq!(transport.remote_addr(), second.local_addr().unwrap());
    }
}

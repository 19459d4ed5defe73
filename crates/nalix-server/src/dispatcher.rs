//! A trivial [`Dispatcher`] that only logs, proving the seam compiles
//! and runs. Concrete routing/handler logic belongs to a collaborator
//! outside this shell's scope.

use bytes::Bytes;

use nalix_net::{ConnectionHandle, Dispatcher, DisconnectReason};

/// Logs each frame, send and close; does not interpret or route frames.
#[derive(Default)]
pub struct LoggingDispatcher;

impl Dispatcher for LoggingDispatcher {
    fn on_frame(&self, conn: &ConnectionHandle, frame: Bytes) {
        tracing::debug!(conn = conn.id(), peer = %conn.remote_addr(), bytes = frame.len(), "frame delivered");
    }

    fn on_post_process(&self, conn: &ConnectionHandle) {
        tracing::trace!(conn = conn.id(), "send completed");
    }

    fn on_close(&self, conn: &ConnectionHandle, reason: DisconnectReason) {
        tracing::info!(conn = conn.id(), peer = %conn.remote_addr(), ?reason, "connection closed");
    }
}

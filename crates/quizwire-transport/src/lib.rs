//! Transport abstraction layer for Quizwire.
//!
//! Provides the [`Transport`] and [`Connection`] traits. A connection is
//! message-oriented: every `recv` yields exactly one frame as it was passed
//! to `send` on the other side, in order. The quiz protocol never re-frames
//! a byte stream itself.
//!
//! # Implementations
//!
//! - [`WebSocketTransport`] / [`WebSocketConnection`]: binary WebSocket
//!   messages via `tokio-tungstenite` (feature `websocket`, default)
//! - [`MemoryConnection`]: an in-process pair over tokio channels, used
//!   by tests and by anything that wants to run both ends in one process

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

mod error;
mod memory;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use memory::MemoryConnection;
#[cfg(feature = "websocket")]
pub use websocket::{
    ClientStream, HANDSHAKE_TIMEOUT, WebSocketConnection, WebSocketTransport,
};

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

/// Counter for generating unique connection IDs across all transports.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_connection_id() -> ConnectionId {
    ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send;

    /// Gracefully shuts down the transport, stopping new connections.
    fn shutdown(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// A single ordered, reliable, message-oriented channel to one peer.
///
/// The returned futures are `Send` so a session driver that is generic
/// over the connection can still be handed to `tokio::spawn`.
pub trait Connection: Send + Sync + 'static {
    /// Sends one frame to the remote peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// Closes the connection. The peer's next `recv` yields `None` once
    /// it has drained frames already in flight.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

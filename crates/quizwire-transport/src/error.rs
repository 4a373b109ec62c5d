/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed, either by the peer or locally.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// Dialing a remote endpoint failed.
    #[error("connect to {url} failed: {reason}")]
    ConnectFailed { url: String, reason: String },

    /// The transport was shut down.
    #[error("transport shut down")]
    Shutdown,
}

impl TransportError {
    /// Returns `true` if the error means the peer went away rather than
    /// an I/O fault on our side.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::ConnectionClosed(_) | Self::Shutdown)
    }
}

//! WebSocket transport implementation using `tokio-tungstenite`.
//!
//! Each binary WebSocket message carries exactly one protocol frame.
//! Ping/pong and raw frames are skipped; text messages are handed up as
//! their UTF-8 bytes and left for the codec to reject.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{next_connection_id, Connection, ConnectionId, Transport, TransportError};

/// The stream type behind a client-side connection made with
/// [`WebSocketConnection::connect`].
pub type ClientStream = MaybeTlsStream<TcpStream>;

/// How long a freshly accepted socket gets to complete the WebSocket
/// upgrade before it is dropped.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
    shut_down: AtomicBool,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self {
            listener,
            shut_down: AtomicBool::new(false),
        })
    }

    /// Returns the address the listener is bound to.
    ///
    /// Useful after binding to port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts the next TCP connection without upgrading it.
    ///
    /// Pair with [`WebSocketConnection::handshake`] in a separate task so
    /// that a client which never sends its upgrade request cannot hold up
    /// the listener.
    pub async fn accept_tcp(&self) -> Result<(TcpStream, SocketAddr), TransportError> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(TransportError::Shutdown);
        }
        self.listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    /// Accepts and upgrades in one step. Blocks on the handshake, so a
    /// server serving many clients should use [`accept_tcp`] instead.
    ///
    /// [`accept_tcp`]: WebSocketTransport::accept_tcp
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self.accept_tcp().await?;
        let conn = WebSocketConnection::handshake(stream, HANDSHAKE_TIMEOUT).await?;
        tracing::debug!(id = %conn.id, %addr, "accepted WebSocket connection");
        Ok(conn)
    }

    /// Refuses further `accept` calls. Connections already accepted are
    /// unaffected.
    async fn shutdown(&self) -> Result<(), Self::Error> {
        self.shut_down.store(true, Ordering::Release);
        tracing::debug!("WebSocket transport shut down");
        Ok(())
    }
}

/// A single WebSocket connection, server- or client-side.
///
/// The socket is split so that a `close` issued from another task is not
/// stuck behind a pending `recv`.
pub struct WebSocketConnection<S = TcpStream> {
    id: ConnectionId,
    sink: Mutex<SplitSink<WebSocketStream<S>, Message>>,
    stream: Mutex<SplitStream<WebSocketStream<S>>>,
}

impl<S> WebSocketConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    fn from_stream(ws: WebSocketStream<S>) -> Self {
        let (sink, stream) = ws.split();
        Self {
            id: next_connection_id(),
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        }
    }
}

impl WebSocketConnection {
    /// Runs the server side of the WebSocket upgrade on an accepted socket.
    ///
    /// Fails with `AcceptFailed` (kind `TimedOut`) if the client has not
    /// completed the upgrade within `timeout`.
    pub async fn handshake(stream: TcpStream, timeout: Duration) -> Result<Self, TransportError> {
        let ws = tokio::time::timeout(timeout, tokio_tungstenite::accept_async(stream))
            .await
            .map_err(|_| {
                TransportError::AcceptFailed(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "WebSocket handshake timed out",
                ))
            })?
            .map_err(|e| {
                TransportError::AcceptFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;
        Ok(Self::from_stream(ws))
    }
}

impl WebSocketConnection<ClientStream> {
    /// Dials a WebSocket server, e.g. `ws://127.0.0.1:8000/math`.
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let (ws, _response) =
            tokio_tungstenite::connect_async(url).await.map_err(|e| {
                TransportError::ConnectFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            })?;
        let conn = Self::from_stream(ws);
        tracing::debug!(id = %conn.id, url, "connected WebSocket client");
        Ok(conn)
    }
}

fn broken_pipe(e: tokio_tungstenite::tungstenite::Error) -> TransportError {
    TransportError::SendFailed(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        e,
    ))
}

impl<S> Connection for WebSocketConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let msg = Message::Binary(data.to_vec().into());
        self.sink.lock().await.send(msg).await.map_err(broken_pipe)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_str().as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.sink.lock().await.close().await.map_err(broken_pipe)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

//! `QuizServer` builder and accept loop.
//!
//! This is the entry point for running a quiz server. It ties together
//! the layers: transport → driver → session. Every accepted connection
//! gets its own task and its own random problem source; sessions share
//! nothing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use quizwire_protocol::BinaryCodec;
use quizwire_session::{GameConfig, RandomProblems};
use quizwire_transport::{
    Connection, ConnectionId, HANDSHAKE_TIMEOUT, Transport, WebSocketConnection,
    WebSocketTransport,
};
use rand::rngs::StdRng;
use tokio::net::TcpStream;
use tracing::{debug, error, info};

use crate::QuizwireError;
use crate::driver::run_server_session;

/// Address the server binds to unless told otherwise.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Settings shared by every connection task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. Nothing in
/// here is mutable.
struct Shared {
    config: GameConfig,
    seed: Option<u64>,
}

impl Shared {
    /// A fresh problem source for one connection.
    ///
    /// With a fixed seed, each connection gets `seed + id` so sessions are
    /// reproducible yet distinct.
    fn problems_for(&self, id: ConnectionId) -> RandomProblems<StdRng> {
        let max = self.config.max_operand;
        match self.seed {
            Some(seed) => RandomProblems::seeded(seed.wrapping_add(id.into_inner()), max),
            None => RandomProblems::from_entropy(max),
        }
    }
}

/// Builder for configuring and starting a quiz server.
///
/// # Example
///
/// ```rust,no_run
/// use quizwire::prelude::*;
///
/// # async fn start() -> Result<(), QuizwireError> {
/// let server = QuizServer::builder()
///     .bind("0.0.0.0:8000")
///     .game_config(GameConfig {
///         max_attempts: Some(10),
///         ..GameConfig::default()
///     })
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct QuizServerBuilder {
    bind_addr: String,
    game_config: GameConfig,
    seed: Option<u64>,
}

impl QuizServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            game_config: GameConfig::default(),
            seed: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the game configuration used by every session.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Makes problem generation reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Binds the listener. No connection is accepted until
    /// [`QuizServer::run`] is called.
    pub async fn build(self) -> Result<QuizServer, QuizwireError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let shared = Arc::new(Shared {
            config: self.game_config.validated(),
            seed: self.seed,
        });

        Ok(QuizServer { transport, shared })
    }
}

impl Default for QuizServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound quiz server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct QuizServer {
    transport: WebSocketTransport,
    shared: Arc<Shared>,
}

impl QuizServer {
    /// Creates a new builder.
    pub fn builder() -> QuizServerBuilder {
        QuizServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), QuizwireError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `signal` completes.
    ///
    /// Accepts incoming sockets and spawns a task for each that performs
    /// the WebSocket upgrade and then plays the session. When `signal` fires the listener stops accepting; sessions already
    /// running are left to finish on their own.
    pub async fn run_until<F>(mut self, signal: F) -> Result<(), QuizwireError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(signal);
        info!(addr = ?self.local_addr().ok(), "quiz server running");

        loop {
            tokio::select! {
                () = &mut signal => {
                    info!("shutdown requested, no longer accepting connections");
                    break;
                }
                accepted = self.transport.accept_tcp() => match accepted {
                    Ok((stream, addr)) => self.spawn_session(stream, addr),
                    Err(e) => error!(error = %e, "accept failed"),
                },
            }
        }

        self.transport.shutdown().await?;
        Ok(())
    }

    fn spawn_session(&self, stream: TcpStream, addr: SocketAddr) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let conn = match WebSocketConnection::handshake(stream, HANDSHAKE_TIMEOUT).await {
                Ok(conn) => conn,
                Err(e) => {
                    debug!(%addr, error = %e, "WebSocket handshake failed");
                    return;
                }
            };
            let conn_id = conn.id();
            info!(%conn_id, %addr, "client connected");

            let problems = shared.problems_for(conn_id);
            let config = shared.config.clone();
            if let Err(e) = run_server_session(&conn, BinaryCodec, config, problems).await {
                debug!(%conn_id, error = %e, "connection ended with error");
            }
        });
    }
}

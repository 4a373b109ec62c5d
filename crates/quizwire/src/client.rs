//! Connecting to a quiz server and playing one round.

use quizwire_protocol::BinaryCodec;
use quizwire_session::Answerer;
use quizwire_transport::{Connection, WebSocketConnection};
use tracing::info;

use crate::QuizwireError;
use crate::driver::{ClientSummary, run_client_session};

/// Where a client connects unless told otherwise.
pub const DEFAULT_URL: &str = "ws://127.0.0.1:8000/math";

/// Connects to `url` and plays until the server congratulates.
///
/// `answerer` is asked for every answer and shown every outcome.
///
/// # Errors
/// Fails if the server cannot be reached, and otherwise as
/// [`run_client_session`] does.
pub async fn play<A: Answerer>(url: &str, answerer: &mut A) -> Result<ClientSummary, QuizwireError> {
    let conn = WebSocketConnection::connect(url).await?;
    info!(url, conn_id = %conn.id(), "connected to quiz server");
    run_client_session(&conn, BinaryCodec, answerer).await
}

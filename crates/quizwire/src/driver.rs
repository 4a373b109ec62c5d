//! Session drivers: pump frames between a connection and a session.
//!
//! The state machines in `quizwire-session` never touch the network.
//! The functions here do the I/O for one connection:
//!   1. Receive a frame → feed it to the session
//!   2. Send whatever the session produced
//!   3. Stop at a terminal state, closing the connection
//!
//! Anything that ends the exchange early (peer closed, undecodable frame,
//! send failure) is returned as an `Err`, never as a summary.

use quizwire_protocol::{Codec, Outcome};
use quizwire_session::{
    Answerer, ClientEvent, ClientSession, GameConfig, ProblemSource, ServerSession, ServerStep,
    SessionError,
};
use quizwire_transport::{Connection, ConnectionId, TransportError};
use tracing::{debug, info, warn};

use crate::QuizwireError;

/// How a server session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerEnd {
    /// The client answered correctly and was congratulated.
    Resolved,
    /// The configured attempt cap was reached; the connection was closed
    /// without a verdict.
    AttemptsExhausted,
}

/// What happened during one completed server session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSummary {
    /// Problems sent, the first one included.
    pub problems_issued: u32,
    pub wrong_answers: u32,
    pub end: ServerEnd,
}

/// What happened during one completed client session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSummary {
    /// Answers submitted, the correct one included.
    pub attempts: u32,
    /// The server's congratulations text.
    pub message: String,
}

/// Runs the server side of one quiz over `conn`.
///
/// Sends the first problem immediately, then judges answers until one is
/// correct (or the attempt cap is hit). The connection is closed when the
/// function returns, whatever the outcome.
///
/// # Errors
/// - [`QuizwireError::Transport`] if sending or receiving fails, or the
///   client disconnects before answering correctly
///   ([`TransportError::ConnectionClosed`]).
/// - [`QuizwireError::Protocol`] if the client sends a frame that is not a
///   valid Solution. The session is not retried.
pub async fn run_server_session<T, C, P>(
    conn: &T,
    codec: C,
    config: GameConfig,
    problems: P,
) -> Result<ServerSummary, QuizwireError>
where
    T: Connection,
    C: Codec,
    P: ProblemSource,
{
    let conn_id = conn.id();
    let mut session = ServerSession::with_codec(config, problems, codec);

    let result = pump_server(conn, &mut session).await;
    close_quietly(conn).await;

    match result {
        Ok(end) => {
            let summary = ServerSummary {
                problems_issued: session.problems_issued(),
                wrong_answers: session.wrong_answers(),
                end,
            };
            info!(%conn_id, ?summary, "quiz session finished");
            Ok(summary)
        }
        Err(e) => {
            warn!(
                %conn_id,
                error = %e,
                problems_issued = session.problems_issued(),
                "quiz session aborted"
            );
            Err(e)
        }
    }
}

async fn pump_server<T, C, P>(
    conn: &T,
    session: &mut ServerSession<P, C>,
) -> Result<ServerEnd, QuizwireError>
where
    T: Connection,
    C: Codec,
    P: ProblemSource,
{
    let conn_id = conn.id();
    let first = session.start()?;
    conn.send(&first).await?;

    loop {
        let Some(frame) = conn.recv().await? else {
            return Err(TransportError::ConnectionClosed(format!(
                "{conn_id} closed by client before the quiz was resolved"
            ))
            .into());
        };

        match session.on_frame(&frame)? {
            ServerStep::Reply(reply) => {
                info!(%conn_id, "wrong answer, sending new problem");
                conn.send(&reply).await?;
            }
            ServerStep::Finish(reply) => {
                conn.send(&reply).await?;
                return Ok(ServerEnd::Resolved);
            }
            ServerStep::GiveUp => return Ok(ServerEnd::AttemptsExhausted),
            ServerStep::Ignored => {}
        }
    }
}

/// Runs the client side of one quiz over `conn`.
///
/// Waits for the server's problem, asks `answerer` for each answer and
/// shows it every outcome, until the server congratulates. The connection
/// is closed when the function returns.
///
/// # Errors
/// - [`QuizwireError::Transport`] on I/O failure or if the server closes
///   before congratulating (e.g. after an attempt cap).
/// - [`QuizwireError::Protocol`] if the server sends an undecodable or
///   unexpected frame.
/// - [`QuizwireError::Session`] if `answerer` cannot produce an answer.
pub async fn run_client_session<T, C, A>(
    conn: &T,
    codec: C,
    answerer: &mut A,
) -> Result<ClientSummary, QuizwireError>
where
    T: Connection,
    C: Codec,
    A: Answerer,
{
    let conn_id = conn.id();
    let mut session = ClientSession::with_codec(codec);

    let result = pump_client(conn, &mut session, answerer).await;
    close_quietly(conn).await;

    let message = result?;
    let summary = ClientSummary {
        attempts: session.attempts(),
        message,
    };
    debug!(%conn_id, ?summary, "quiz solved");
    Ok(summary)
}

/// Returns the congratulations text.
async fn pump_client<T, C, A>(
    conn: &T,
    session: &mut ClientSession<C>,
    answerer: &mut A,
) -> Result<String, QuizwireError>
where
    T: Connection,
    C: Codec,
    A: Answerer,
{
    loop {
        let Some(frame) = conn.recv().await? else {
            return Err(TransportError::ConnectionClosed(format!(
                "{} closed by server before congratulations",
                conn.id()
            ))
            .into());
        };

        let problem = match session.on_frame(&frame)? {
            ClientEvent::Problem(problem) => problem,
            ClientEvent::Outcome(outcome) => {
                answerer.show_outcome(&outcome);
                match outcome {
                    Outcome::Congratulations(c) => return Ok(c.message),
                    Outcome::NewProblem(problem) => problem,
                }
            }
        };

        // The server does not speak while a problem is open, so anything
        // that arrives here ends the session instead of waiting on the
        // answerer forever.
        let answer = tokio::select! {
            biased;
            answer = answerer.answer(&problem) => answer?,
            frame = conn.recv() => return Err(interrupted(conn.id(), frame)),
        };
        let solution = session.submit(answer)?;
        conn.send(&solution).await?;
    }
}

fn interrupted(
    conn_id: ConnectionId,
    frame: Result<Option<Vec<u8>>, TransportError>,
) -> QuizwireError {
    match frame {
        Ok(Some(_)) => {
            SessionError::InvalidState("frame received while an answer is pending").into()
        }
        Ok(None) => TransportError::ConnectionClosed(format!(
            "{conn_id} closed by server while an answer was pending"
        ))
        .into(),
        Err(e) => e.into(),
    }
}

/// The peer may already have closed; that is not worth reporting.
async fn close_quietly<T: Connection>(conn: &T) {
    if let Err(e) = conn.close().await {
        debug!(conn_id = %conn.id(), error = %e, "close after session failed");
    }
}

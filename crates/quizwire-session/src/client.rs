//! The client half of a quiz session.
//!
//! Like the server side, [`ClientSession`] only turns frames into events
//! and answers into frames. Obtaining the answer is the caller's business
//! (see [`Answerer`](crate::Answerer)); the driver runs it between
//! [`ClientSession::on_frame`] and [`ClientSession::submit`].
//!
//! ```text
//!                   Problem                    submit()
//!  AwaitingProblem ─────────▶ Answering ───────────────▶ AwaitingOutcome
//!                                 ▲                          │      │
//!                                 └──── Outcome::NewProblem ─┘      │
//!                                                                   │
//!                                   Outcome::Congratulations        ▼
//!                                                                  Done
//! ```

use quizwire_protocol::{BinaryCodec, Codec, Congratulations, Outcome, Problem, Solution};
use tracing::debug;

use crate::SessionError;

/// Where a client session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientState {
    /// Connected, waiting for the server's first problem.
    AwaitingProblem,
    /// A problem arrived; the caller owes an answer.
    Answering { problem: Problem },
    /// An answer was sent; waiting for the verdict.
    AwaitingOutcome { problem: Problem },
    /// The server congratulated us. Terminal.
    Done,
}

/// What a received frame meant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The server's opening problem. An answer is now owed.
    Problem(Problem),
    /// The server's verdict. For `NewProblem` an answer is owed again;
    /// for `Congratulations` the session is done.
    Outcome(Outcome),
}

/// One quiz as seen from the client.
pub struct ClientSession<C = BinaryCodec> {
    codec: C,
    state: ClientState,
    attempts: u32,
    congratulations: Option<Congratulations>,
}

impl ClientSession {
    /// Creates a session using the binary wire format.
    pub fn new() -> Self {
        Self::with_codec(BinaryCodec)
    }
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> ClientSession<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec,
            state: ClientState::AwaitingProblem,
            attempts: 0,
            congratulations: None,
        }
    }

    /// Interprets one frame from the server.
    ///
    /// # Errors
    /// - [`SessionError::Protocol`] if the frame is not the expected kind
    ///   (a Problem first, an Outcome afterwards) or is malformed.
    /// - [`SessionError::InvalidState`] if the server speaks out of turn:
    ///   while an answer is still owed, or after the session is done.
    pub fn on_frame(&mut self, frame: &[u8]) -> Result<ClientEvent, SessionError> {
        match &self.state {
            ClientState::AwaitingProblem => {
                let problem: Problem = self.codec.decode(frame)?;
                debug!(%problem, "received problem");
                self.state = ClientState::Answering { problem };
                Ok(ClientEvent::Problem(problem))
            }
            ClientState::AwaitingOutcome { .. } => {
                let outcome: Outcome = self.codec.decode(frame)?;
                match &outcome {
                    Outcome::Congratulations(c) => {
                        debug!(message = %c.message, "received congratulations");
                        self.congratulations = Some(c.clone());
                        self.state = ClientState::Done;
                    }
                    Outcome::NewProblem(problem) => {
                        debug!(%problem, "received new problem");
                        self.state = ClientState::Answering { problem: *problem };
                    }
                }
                Ok(ClientEvent::Outcome(outcome))
            }
            ClientState::Answering { .. } => Err(SessionError::InvalidState(
                "frame received while an answer is pending",
            )),
            ClientState::Done => Err(SessionError::InvalidState(
                "frame received after the session finished",
            )),
        }
    }

    /// Turns the caller's answer into a Solution frame.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] unless a problem is awaiting an answer.
    pub fn submit(&mut self, answer: i32) -> Result<Vec<u8>, SessionError> {
        let ClientState::Answering { problem } = self.state else {
            return Err(SessionError::InvalidState("no problem awaiting an answer"));
        };
        let frame = self.codec.encode(&Solution::new(answer))?;
        self.attempts = self.attempts.saturating_add(1);
        debug!(%problem, answer, attempt = self.attempts, "submitting answer");
        self.state = ClientState::AwaitingOutcome { problem };
        Ok(frame)
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// The problem currently awaiting an answer, if any.
    pub fn pending_problem(&self) -> Option<&Problem> {
        match &self.state {
            ClientState::Answering { problem } => Some(problem),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == ClientState::Done
    }

    /// Answers submitted so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The server's success message, once the session is done.
    pub fn congratulations(&self) -> Option<&Congratulations> {
        self.congratulations.as_ref()
    }
}

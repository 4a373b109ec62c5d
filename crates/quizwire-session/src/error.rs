//! Error types for the session layer.

use quizwire_protocol::ProtocolError;

/// Errors that can occur while driving a quiz session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A frame could not be decoded (or, for the JSON codec, encoded).
    /// Fatal to the session: it is aborted, never retried.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The operation is not valid in the session's current state, e.g.
    /// submitting an answer while no problem is outstanding.
    #[error("invalid session state: {0}")]
    InvalidState(&'static str),

    /// The caller could not supply an answer (input closed, script ran
    /// out, ...).
    #[error("no answer available: {0}")]
    AnswerUnavailable(String),
}

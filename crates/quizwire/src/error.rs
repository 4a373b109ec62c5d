//! Unified error type for Quizwire.

use quizwire_protocol::ProtocolError;
use quizwire_session::SessionError;
use quizwire_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `quizwire` crate you deal with this single error type
/// instead of importing errors from each sub-crate. Every sub-crate error
/// converts with `?`.
#[derive(Debug, thiserror::Error)]
pub enum QuizwireError {
    /// A transport-level error (bind, connect, send, recv, or the peer
    /// closing before the quiz ended).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be decoded. The session was aborted.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (out-of-turn call, no answer available).
    #[error(transparent)]
    Session(SessionError),
}

/// Decode failures surface as [`QuizwireError::Protocol`] no matter which
/// layer noticed them.
impl From<SessionError> for QuizwireError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Protocol(e) => Self::Protocol(e),
            other => Self::Session(other),
        }
    }
}

impl QuizwireError {
    /// Returns `true` if the peer went away before the quiz finished.
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_closed())
    }
}

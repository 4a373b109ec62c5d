//! # Quizwire
//!
//! An arithmetic quiz played over WebSockets.
//!
//! The server sends a problem `a + b`, the client answers, and the server
//! either congratulates or sends a fresh problem, for as long as it takes.
//! The pieces live in their own crates (transport, wire protocol, session
//! rules); this crate wires them together into a runnable server and
//! client.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quizwire::prelude::*;
//!
//! # async fn demo() -> Result<(), QuizwireError> {
//! // Server side:
//! let server = QuizServer::builder().bind("127.0.0.1:8000").build().await?;
//! tokio::spawn(server.run());
//!
//! // Client side:
//! let mut answerer = ScriptedAnswerer::always_correct();
//! let summary = play("ws://127.0.0.1:8000/math", &mut answerer).await?;
//! println!("{}", summary.message);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod driver;
mod error;
pub mod server;

pub use error::QuizwireError;

// Re-export sub-crates so users can depend on `quizwire` alone.
pub use quizwire_protocol as protocol;
pub use quizwire_session as session;
pub use quizwire_transport as transport;

/// Everything needed to run a server or a client.
pub mod prelude {
    pub use crate::QuizwireError;
    pub use crate::client::{DEFAULT_URL, play};
    pub use crate::driver::{
        ClientSummary, ServerEnd, ServerSummary, run_client_session, run_server_session,
    };
    pub use crate::server::{DEFAULT_BIND_ADDR, QuizServer, QuizServerBuilder};

    pub use quizwire_protocol::{
        BinaryCodec, Codec, Congratulations, DecodeError, Outcome, Problem, ProtocolError,
        Solution,
    };
    pub use quizwire_session::{
        Answerer, FixedProblems, GameConfig, ProblemSource, RandomProblems, ScriptedAnswerer,
        SessionError,
    };
    pub use quizwire_transport::{Connection, MemoryConnection, TransportError};
}

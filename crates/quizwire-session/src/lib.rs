//! Quiz session logic for Quizwire.
//!
//! This crate knows the rules of the game and nothing about sockets:
//!
//! 1. **Server side**: issue a problem, judge each Solution, reply with a
//!    new problem or congratulations ([`ServerSession`])
//! 2. **Client side**: accept problems, submit answers, recognise the end
//!    of the quiz ([`ClientSession`])
//! 3. **Inputs**: where problems come from ([`ProblemSource`]) and where
//!    answers come from ([`Answerer`])
//!
//! Both session types take bytes in and hand bytes out, so a driver can
//! run them over any [`Connection`](https://docs.rs/quizwire-transport)
//! and tests can run them with no I/O at all.
//!
//! # How it fits in the stack
//!
//! ```text
//! Drivers / server (above)  ← read frames, feed sessions, send replies
//!     ↕
//! Session Layer (this crate)  ← game rules and state machines
//!     ↕
//! Protocol Layer (below)  ← Problem, Solution, Outcome and their codecs
//! ```

mod answer;
mod client;
mod config;
mod error;
mod problem;
mod server;

pub use answer::{Answerer, ScriptedAnswerer};
pub use client::{ClientEvent, ClientSession, ClientState};
pub use config::{DEFAULT_MAX_OPERAND, DEFAULT_SUCCESS_MESSAGE, GameConfig};
pub use error::SessionError;
pub use problem::{FixedProblems, ProblemSource, RandomProblems};
pub use server::{ServerSession, ServerState, ServerStep};

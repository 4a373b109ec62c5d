//! The four message shapes that travel on the wire.
//!
//! ```text
//! server ── Problem ──────────────────────────────▶ client
//! server ◀───────────────────────────── Solution ── client
//! server ── Outcome::NewProblem(Problem) ─────────▶ client   (wrong answer)
//! server ◀───────────────────────────── Solution ── client
//! server ── Outcome::Congratulations(..) ─────────▶ client   (terminal)
//! ```
//!
//! `Congratulations` also exists as a standalone message so that a peer
//! can send the success text on its own; the game server always wraps it
//! in an [`Outcome`].

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MessageKind
// ---------------------------------------------------------------------------

/// Discriminates the four message shapes. The numeric value is the first
/// byte of every binary frame and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MessageKind {
    Problem = 0x01,
    Solution = 0x02,
    Congratulations = 0x03,
    Outcome = 0x04,
}

impl MessageKind {
    /// Parses the leading kind byte of a frame.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Problem),
            0x02 => Some(Self::Solution),
            0x03 => Some(Self::Congratulations),
            0x04 => Some(Self::Outcome),
            _ => None,
        }
    }

    /// The byte written at the start of a frame of this kind.
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Problem => "Problem",
            Self::Solution => "Solution",
            Self::Congratulations => "Congratulations",
            Self::Outcome => "Outcome",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Problem / Solution
// ---------------------------------------------------------------------------

/// An addition challenge: the client must answer `a + b`.
///
/// The generator keeps both operands in `[1, max]`. A decoded problem is
/// taken as-is; bounds are a property of whoever created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Problem {
    pub a: i32,
    pub b: i32,
}

impl Problem {
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// The correct answer, recomputed from the operands on every call.
    ///
    /// Widened to `i64` so that any pair of decoded operands sums without
    /// overflow.
    pub fn expected(&self) -> i64 {
        i64::from(self.a) + i64::from(self.b)
    }

    /// Returns `true` if `solution` answers this problem correctly.
    pub fn is_solved_by(&self, solution: &Solution) -> bool {
        i64::from(solution.answer) == self.expected()
    }

    /// Returns `true` if both operands lie in `[1, max]`.
    pub fn is_within(&self, max: i32) -> bool {
        (1..=max).contains(&self.a) && (1..=max).contains(&self.b)
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}", self.a, self.b)
    }
}

/// The client's answer to the outstanding [`Problem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Solution {
    pub answer: i32,
}

impl Solution {
    pub fn new(answer: i32) -> Self {
        Self { answer }
    }
}

// ---------------------------------------------------------------------------
// Congratulations / Outcome
// ---------------------------------------------------------------------------

/// Success text sent when the client answers correctly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Congratulations {
    pub message: String,
}

impl Congratulations {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The server's verdict on a [`Solution`].
///
/// Exactly one variant is ever present: the type cannot express "both" or
/// "neither", and the binary decoder rejects frames that try to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Correct answer. The exchange is over.
    Congratulations(Congratulations),
    /// Wrong answer. This problem replaces the previous one.
    NewProblem(Problem),
}

impl Outcome {
    /// Returns `true` if this outcome ends the exchange.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Congratulations(_))
    }
}

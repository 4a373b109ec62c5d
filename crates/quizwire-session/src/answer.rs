//! The caller side of a client session: who supplies the answers.
//!
//! Quizwire doesn't decide how answers are obtained. A terminal prompt,
//! a bot, and a test script all implement [`Answerer`], and the client
//! driver asks it for an answer whenever a problem is outstanding.

use std::collections::VecDeque;
use std::future::Future;

use quizwire_protocol::{Outcome, Problem};

use crate::SessionError;

/// Supplies answers to problems and observes outcomes.
///
/// `answer` may suspend for as long as it likes (an interactive prompt
/// waits for the user). The client driver keeps reading the connection
/// meanwhile and drops the pending future if the server hangs up.
///
/// # Example
///
/// ```rust
/// use quizwire_protocol::Problem;
/// use quizwire_session::{Answerer, SessionError};
///
/// /// Always one too many.
/// struct OffByOne;
///
/// impl Answerer for OffByOne {
///     async fn answer(&mut self, problem: &Problem) -> Result<i32, SessionError> {
///         Ok(problem.a + problem.b + 1)
///     }
/// }
/// ```
pub trait Answerer: Send {
    /// Returns the answer to submit for `problem`.
    fn answer(
        &mut self,
        problem: &Problem,
    ) -> impl Future<Output = Result<i32, SessionError>> + Send;

    /// Called with every outcome the server sends, before `answer` is
    /// asked about a replacement problem.
    fn show_outcome(&mut self, _outcome: &Outcome) {}
}

/// An [`Answerer`] that replays a fixed list of answers.
///
/// Records every problem and outcome it is shown so tests can inspect the
/// exchange afterwards.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAnswerer {
    script: VecDeque<i32>,
    correct_when_exhausted: bool,
    problems: Vec<Problem>,
    outcomes: Vec<Outcome>,
}

impl ScriptedAnswerer {
    /// Answers with `answers` in order, then fails with
    /// [`SessionError::AnswerUnavailable`].
    pub fn new(answers: impl IntoIterator<Item = i32>) -> Self {
        Self {
            script: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Always answers correctly.
    pub fn always_correct() -> Self {
        Self {
            correct_when_exhausted: true,
            ..Self::default()
        }
    }

    /// After the scripted answers run out, answer correctly.
    pub fn then_correct(mut self) -> Self {
        self.correct_when_exhausted = true;
        self
    }

    /// Problems this answerer was asked to solve, in order.
    pub fn problems_seen(&self) -> &[Problem] {
        &self.problems
    }

    /// Outcomes this answerer was shown, in order.
    pub fn outcomes_seen(&self) -> &[Outcome] {
        &self.outcomes
    }
}

impl Answerer for ScriptedAnswerer {
    async fn answer(&mut self, problem: &Problem) -> Result<i32, SessionError> {
        self.problems.push(*problem);
        if let Some(answer) = self.script.pop_front() {
            return Ok(answer);
        }
        if self.correct_when_exhausted {
            return i32::try_from(problem.expected()).map_err(|_| {
                SessionError::AnswerUnavailable(format!("{problem} does not fit in i32"))
            });
        }
        Err(SessionError::AnswerUnavailable("script exhausted".into()))
    }

    fn show_outcome(&mut self, outcome: &Outcome) {
        self.outcomes.push(outcome.clone());
    }
}

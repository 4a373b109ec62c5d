//! Problem generation.
//!
//! The server never reaches for a global random generator: every session
//! owns a [`ProblemSource`], so sessions are independently seedable and
//! concurrent sessions never share a non-thread-safe generator.

use quizwire_protocol::Problem;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces the next problem for a session.
pub trait ProblemSource: Send {
    fn next_problem(&mut self) -> Problem;
}

/// Draws both operands uniformly and independently from `[1, max]`.
#[derive(Debug, Clone)]
pub struct RandomProblems<R> {
    rng: R,
    max: i32,
}

impl<R: Rng> RandomProblems<R> {
    /// Wraps an existing random source. `max` below 1 is treated as 1.
    pub fn new(rng: R, max: i32) -> Self {
        Self {
            rng,
            max: max.max(1),
        }
    }

    /// The inclusive upper bound for operands.
    pub fn max(&self) -> i32 {
        self.max
    }
}

impl RandomProblems<StdRng> {
    /// A reproducible source: the same seed yields the same problems.
    pub fn seeded(seed: u64, max: i32) -> Self {
        Self::new(StdRng::seed_from_u64(seed), max)
    }

    /// A fresh source seeded from the thread-local generator.
    pub fn from_entropy(max: i32) -> Self {
        Self::new(StdRng::from_rng(&mut rand::rng()), max)
    }
}

impl<R: Rng + Send> ProblemSource for RandomProblems<R> {
    fn next_problem(&mut self) -> Problem {
        let a = self.rng.random_range(1..=self.max);
        let b = self.rng.random_range(1..=self.max);
        Problem::new(a, b)
    }
}

/// Replays a fixed list of problems, starting over when it runs out.
///
/// ```rust
/// use quizwire_protocol::Problem;
/// use quizwire_session::{FixedProblems, ProblemSource};
///
/// let mut source = FixedProblems::new(Problem::new(7, 5)).then(Problem::new(2, 3));
/// assert_eq!(source.next_problem(), Problem::new(7, 5));
/// assert_eq!(source.next_problem(), Problem::new(2, 3));
/// assert_eq!(source.next_problem(), Problem::new(7, 5));
/// ```
#[derive(Debug, Clone)]
pub struct FixedProblems {
    problems: Vec<Problem>,
    next: usize,
}

impl FixedProblems {
    pub fn new(first: Problem) -> Self {
        Self {
            problems: vec![first],
            next: 0,
        }
    }

    /// Appends another problem to the script.
    pub fn then(mut self, problem: Problem) -> Self {
        self.problems.push(problem);
        self
    }
}

impl ProblemSource for FixedProblems {
    fn next_problem(&mut self) -> Problem {
        let problem = self.problems[self.next];
        self.next = (self.next + 1) % self.problems.len();
        problem
    }
}

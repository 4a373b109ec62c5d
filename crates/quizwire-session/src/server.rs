//! The server half of a quiz session.
//!
//! [`ServerSession`] is a pure state machine: it is handed incoming frames
//! and hands back the frames to send. It never touches a socket, which is
//! what makes it testable without a network and reusable over any
//! transport.
//!
//! ```text
//!            start()                 correct answer
//!   Idle ──────────────▶ AwaitingAnswer ──────────────▶ Resolved
//!                          │    ▲
//!             wrong answer │    │ new problem
//!                          └────┘
//!                          │
//!                          │ wrong answer, attempt cap reached
//!                          ▼
//!                       Exhausted
//! ```

use quizwire_protocol::{BinaryCodec, Codec, Congratulations, Outcome, Problem, Solution};
use tracing::{debug, info};

use crate::{GameConfig, ProblemSource, SessionError};

/// Where a server session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerState {
    /// Created; the first problem has not been issued yet.
    Idle,
    /// A problem is outstanding and the client owes an answer.
    AwaitingAnswer { problem: Problem },
    /// The client answered correctly. Terminal.
    Resolved,
    /// The attempt cap was reached without a correct answer. Terminal.
    Exhausted,
}

impl ServerState {
    /// Returns `true` if no further answers will be judged.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Exhausted)
    }
}

/// What the driver must do after feeding a frame to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStep {
    /// Send this frame (a NewProblem outcome) and keep reading.
    Reply(Vec<u8>),
    /// Send this frame (the Congratulations outcome), then end the session.
    Finish(Vec<u8>),
    /// End the session without sending anything.
    GiveUp,
    /// The session had already ended; the frame was dropped.
    Ignored,
}

/// One client's quiz, from first problem to verdict.
pub struct ServerSession<P, C = BinaryCodec> {
    config: GameConfig,
    problems: P,
    codec: C,
    state: ServerState,
    problems_issued: u32,
    wrong_answers: u32,
}

impl<P: ProblemSource> ServerSession<P> {
    /// Creates a session using the binary wire format.
    pub fn new(config: GameConfig, problems: P) -> Self {
        Self::with_codec(config, problems, BinaryCodec)
    }
}

impl<P: ProblemSource, C: Codec> ServerSession<P, C> {
    pub fn with_codec(config: GameConfig, problems: P, codec: C) -> Self {
        Self {
            config: config.validated(),
            problems,
            codec,
            state: ServerState::Idle,
            problems_issued: 0,
            wrong_answers: 0,
        }
    }

    /// Issues the first problem and returns its frame.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] if the session was already started.
    pub fn start(&mut self) -> Result<Vec<u8>, SessionError> {
        if self.state != ServerState::Idle {
            return Err(SessionError::InvalidState("session already started"));
        }
        let problem = self.problems.next_problem();
        let frame = self.codec.encode(&problem)?;
        self.issue(problem);
        Ok(frame)
    }

    /// Judges one incoming frame.
    ///
    /// # Errors
    /// - [`SessionError::Protocol`] if the frame is not a valid Solution.
    ///   The session is unusable afterwards and must be torn down.
    /// - [`SessionError::InvalidState`] if called before [`start`](Self::start).
    pub fn on_frame(&mut self, frame: &[u8]) -> Result<ServerStep, SessionError> {
        let problem = match &self.state {
            ServerState::AwaitingAnswer { problem } => *problem,
            ServerState::Idle => {
                return Err(SessionError::InvalidState(
                    "frame received before the first problem",
                ));
            }
            ServerState::Resolved | ServerState::Exhausted => {
                debug!(
                    state = ?self.state,
                    len = frame.len(),
                    "ignoring frame after session ended"
                );
                return Ok(ServerStep::Ignored);
            }
        };

        let solution: Solution = self.codec.decode(frame)?;
        info!(
            answer = solution.answer,
            expected = problem.expected(),
            "received answer"
        );

        if problem.is_solved_by(&solution) {
            let outcome = Outcome::Congratulations(Congratulations::new(
                self.config.success_message.clone(),
            ));
            let frame = self.codec.encode(&outcome)?;
            self.state = ServerState::Resolved;
            info!(attempts = self.attempts(), "correct answer, session resolved");
            return Ok(ServerStep::Finish(frame));
        }

        self.wrong_answers = self.wrong_answers.saturating_add(1);
        if let Some(cap) = self.config.max_attempts {
            if self.wrong_answers >= cap {
                self.state = ServerState::Exhausted;
                info!(attempts = self.attempts(), "attempt cap reached, giving up");
                return Ok(ServerStep::GiveUp);
            }
        }

        let next = self.problems.next_problem();
        let frame = self.codec.encode(&Outcome::NewProblem(next))?;
        self.issue(next);
        Ok(ServerStep::Reply(frame))
    }

    fn issue(&mut self, problem: Problem) {
        self.problems_issued = self.problems_issued.saturating_add(1);
        info!(%problem, issued = self.problems_issued, "issuing problem");
        self.state = ServerState::AwaitingAnswer { problem };
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// The problem the client currently owes an answer to, if any.
    pub fn current_problem(&self) -> Option<&Problem> {
        match &self.state {
            ServerState::AwaitingAnswer { problem } => Some(problem),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn problems_issued(&self) -> u32 {
        self.problems_issued
    }

    pub fn wrong_answers(&self) -> u32 {
        self.wrong_answers
    }

    /// Answers judged so far, right or wrong.
    pub fn attempts(&self) -> u32 {
        self.wrong_answers
            .saturating_add(u32::from(self.state == ServerState::Resolved))
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    //! Tests follow `test_{function}_{scenario}_{expected}`.

    use super::*;
    use crate::{FixedProblems, RandomProblems};
    use quizwire_protocol::{DecodeError, ProtocolError};

    const MAX: i32 = 19;

    fn codec() -> BinaryCodec {
        BinaryCodec
    }

    fn solution(answer: i32) -> Vec<u8> {
        codec().encode(&Solution::new(answer)).unwrap()
    }

    fn decode_outcome(frame: &[u8]) -> Outcome {
        codec().decode(frame).expect("outcome frame")
    }

    fn fixed_session() -> ServerSession<FixedProblems> {
        let problems = FixedProblems::new(Problem::new(7, 5)).then(Problem::new(2, 3));
        ServerSession::new(GameConfig::default(), problems)
    }

    // =====================================================================
    // start()
    // =====================================================================

    #[test]
    fn test_start_seeded_first_problem_within_bounds() {
        for seed in 0..20 {
            let mut session =
                ServerSession::new(GameConfig::default(), RandomProblems::seeded(seed, MAX));
            let frame = session.start().unwrap();
            let problem: Problem = codec().decode(&frame).unwrap();
            assert!(problem.is_within(MAX), "seed {seed}: {problem:?}");
            assert_eq!(session.current_problem(), Some(&problem));
        }
    }

    #[test]
    fn test_start_twice_is_invalid_state() {
        let mut session = fixed_session();
        session.start().unwrap();
        let err = session.start().unwrap_err();
        assert!(matches!(err, SessionError::InvalidState(_)));
    }

    #[test]
    fn test_on_frame_before_start_is_invalid_state() {
        let mut session = fixed_session();
        let err = session.on_frame(&solution(12)).unwrap_err();
        assert!(matches!(err, SessionError::InvalidState(_)));
    }

    // =====================================================================
    // on_frame(): correct answers
    // =====================================================================

    #[test]
    fn test_on_frame_correct_answer_finishes_with_congratulations() {
        let mut session = fixed_session();
        session.start().unwrap();

        let step = session.on_frame(&solution(12)).unwrap();
        let ServerStep::Finish(frame) = step else {
            panic!("expected Finish, got {step:?}");
        };
        assert_eq!(
            decode_outcome(&frame),
            Outcome::Congratulations(Congratulations::new("Congratulations! Correct answer!"))
        );
        assert_eq!(session.state(), &ServerState::Resolved);
        assert!(session.is_terminal());
        assert_eq!(session.current_problem(), None);
        assert_eq!(session.attempts(), 1);
    }

    #[test]
    fn test_on_frame_seeded_correct_answer_resolves() {
        let mut session =
            ServerSession::new(GameConfig::default(), RandomProblems::seeded(99, MAX));
        let first: Problem = codec().decode(&session.start().unwrap()).unwrap();
        let answer = first.a + first.b;

        let step = session.on_frame(&solution(answer)).unwrap();
        assert!(matches!(step, ServerStep::Finish(_)));
        assert_eq!(session.state(), &ServerState::Resolved);
    }

    #[test]
    fn test_on_frame_custom_success_message() {
        let config = GameConfig {
            success_message: "Well done".into(),
            ..GameConfig::default()
        };
        let mut session = ServerSession::new(config, FixedProblems::new(Problem::new(1, 1)));
        session.start().unwrap();

        let ServerStep::Finish(frame) = session.on_frame(&solution(2)).unwrap() else {
            panic!("expected Finish");
        };
        assert_eq!(
            decode_outcome(&frame),
            Outcome::Congratulations(Congratulations::new("Well done"))
        );
    }

    // =====================================================================
    // on_frame(): wrong answers
    // =====================================================================

    #[test]
    fn test_on_frame_wrong_answer_replies_new_problem() {
        let mut session = fixed_session();
        session.start().unwrap();

        let step = session.on_frame(&solution(11)).unwrap();
        let ServerStep::Reply(frame) = step else {
            panic!("expected Reply, got {step:?}");
        };
        assert_eq!(decode_outcome(&frame), Outcome::NewProblem(Problem::new(2, 3)));
        assert_eq!(session.current_problem(), Some(&Problem::new(2, 3)));
        assert!(!session.is_terminal());
        assert_eq!(session.wrong_answers(), 1);
        assert_eq!(session.problems_issued(), 2);
    }

    #[test]
    fn test_on_frame_judges_against_replacement_problem() {
        let mut session = fixed_session();
        session.start().unwrap();
        session.on_frame(&solution(11)).unwrap();

        // 12 was right for the first problem but the held one is now 2 + 3.
        let step = session.on_frame(&solution(12)).unwrap();
        assert!(matches!(step, ServerStep::Reply(_)));

        let step = session.on_frame(&solution(12)).unwrap();
        assert!(matches!(step, ServerStep::Finish(_)));
    }

    #[test]
    fn test_on_frame_repeated_wrong_answers_never_terminate() {
        let mut session =
            ServerSession::new(GameConfig::default(), RandomProblems::seeded(5, MAX));
        session.start().unwrap();

        for round in 1..=200 {
            // No operand pair in [1, 19] sums to 0.
            let step = session.on_frame(&solution(0)).unwrap();
            let ServerStep::Reply(frame) = step else {
                panic!("round {round}: expected Reply, got {step:?}");
            };
            let Outcome::NewProblem(problem) = decode_outcome(&frame) else {
                panic!("round {round}: expected NewProblem");
            };
            assert!(problem.is_within(MAX));
            assert!(!session.is_terminal());
        }
        assert_eq!(session.wrong_answers(), 200);
    }

    #[test]
    fn test_on_frame_counters_saturate_instead_of_overflowing() {
        let mut session = fixed_session();
        session.start().unwrap();
        session.wrong_answers = u32::MAX;
        session.problems_issued = u32::MAX;

        let step = session.on_frame(&solution(11)).unwrap();
        assert!(matches!(step, ServerStep::Reply(_)));
        assert_eq!(session.wrong_answers(), u32::MAX);
        assert_eq!(session.problems_issued(), u32::MAX);
        assert!(!session.is_terminal());

        // 2 + 3 is now held; resolving must not overflow attempts either.
        assert!(matches!(session.on_frame(&solution(5)).unwrap(), ServerStep::Finish(_)));
        assert_eq!(session.attempts(), u32::MAX);
    }

    #[test]
    fn test_on_frame_oversized_success_message_still_finishes() {
        let config = GameConfig {
            success_message: "x".repeat(70_000),
            ..GameConfig::default()
        };
        let mut session = ServerSession::new(config, FixedProblems::new(Problem::new(1, 1)));
        session.start().unwrap();

        let ServerStep::Finish(frame) = session.on_frame(&solution(2)).unwrap() else {
            panic!("expected Finish");
        };
        assert!(frame.len() <= quizwire_protocol::MAX_FRAME_LEN);
        let Outcome::Congratulations(c) = decode_outcome(&frame) else {
            panic!("expected Congratulations");
        };
        assert_eq!(c.message.len(), quizwire_protocol::MAX_MESSAGE_LEN);
        assert_eq!(session.state(), &ServerState::Resolved);
    }

    #[test]
    fn test_on_frame_attempt_cap_gives_up() {
        let config = GameConfig {
            max_attempts: Some(2),
            ..GameConfig::default()
        };
        let mut session = ServerSession::new(config, FixedProblems::new(Problem::new(7, 5)));
        session.start().unwrap();

        assert!(matches!(session.on_frame(&solution(1)).unwrap(), ServerStep::Reply(_)));
        assert_eq!(session.on_frame(&solution(1)).unwrap(), ServerStep::GiveUp);
        assert_eq!(session.state(), &ServerState::Exhausted);
        assert_eq!(session.attempts(), 2);
    }

    // =====================================================================
    // on_frame(): bad frames and late frames
    // =====================================================================

    #[test]
    fn test_on_frame_malformed_is_protocol_error() {
        let mut session = fixed_session();
        session.start().unwrap();

        let mut frame = solution(12);
        frame.pop();
        let err = session.on_frame(&frame).unwrap_err();
        assert!(matches!(err, SessionError::Protocol(e) if e.is_decode()));
    }

    #[test]
    fn test_on_frame_wrong_kind_is_protocol_error() {
        let mut session = fixed_session();
        session.start().unwrap();

        let frame = codec().encode(&Problem::new(1, 2)).unwrap();
        let err = session.on_frame(&frame).unwrap_err();
        assert!(
            matches!(
                err,
                SessionError::Protocol(ProtocolError::Decode(DecodeError::KindMismatch { .. }))
            ),
            "expected kind mismatch, got {err:?}"
        );
        // The outstanding problem is untouched.
        assert_eq!(session.current_problem(), Some(&Problem::new(7, 5)));
    }

    #[test]
    fn test_on_frame_after_resolved_is_ignored() {
        let mut session = fixed_session();
        session.start().unwrap();
        session.on_frame(&solution(12)).unwrap();

        assert_eq!(session.on_frame(&solution(12)).unwrap(), ServerStep::Ignored);
        assert_eq!(session.on_frame(b"garbage").unwrap(), ServerStep::Ignored);
        assert_eq!(session.state(), &ServerState::Resolved);
    }
}

//! Terminal front-end for the math quiz: an interactive answerer and the
//! logging setup shared by the `math-server` and `math-client` binaries.

use quizwire::prelude::*;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs a `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` wins; otherwise `default` (e.g. `"info"`) is used.
pub fn init_logging(default: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// What `math-client` prints, and its exit status, once `play` returns.
///
/// Only a congratulated session exits with 0. A server that hangs up
/// before congratulating counts as a failure.
pub fn report(result: &Result<ClientSummary, QuizwireError>) -> (String, u8) {
    match result {
        Ok(summary) => (summary.message.clone(), 0),
        Err(e) if e.is_connection_closed() => ("Connection closed by server".to_string(), 1),
        Err(e) => (format!("Error: {e}"), 1),
    }
}

// ---------------------------------------------------------------------------
// PromptAnswerer
// ---------------------------------------------------------------------------

/// Asks a human for every answer.
///
/// Prints the problem, then reads lines until one parses as an integer.
/// Anything else gets "Please enter a valid number!" and another prompt.
pub struct PromptAnswerer<R, W> {
    lines: Lines<R>,
    out: W,
    /// Set by `show_outcome`; replaces the plain problem header once.
    header: Option<String>,
}

impl PromptAnswerer<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> PromptAnswerer<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
            header: None,
        }
    }

    /// Gives back the output sink, e.g. to inspect what was printed.
    pub fn into_output(self) -> W {
        self.out
    }

    async fn print(&mut self, text: &str) -> Result<(), SessionError> {
        write_flushed(&mut self.out, text)
            .await
            .map_err(|e| SessionError::AnswerUnavailable(format!("cannot write prompt: {e}")))
    }
}

async fn write_flushed<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await
}

impl<R, W> Answerer for PromptAnswerer<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn answer(&mut self, problem: &Problem) -> Result<i32, SessionError> {
        let header = self
            .header
            .take()
            .unwrap_or_else(|| format!("Problem: {problem} = ?"));
        self.print(&format!("{header}\n")).await?;

        loop {
            self.print("Your answer: ").await?;

            let line = self
                .lines
                .next_line()
                .await
                .map_err(|e| SessionError::AnswerUnavailable(format!("cannot read input: {e}")))?
                .ok_or_else(|| SessionError::AnswerUnavailable("input closed".into()))?;

            match line.trim().parse::<i32>() {
                Ok(answer) => return Ok(answer),
                Err(_) => self.print("Please enter a valid number!\n").await?,
            }
        }
    }

    fn show_outcome(&mut self, outcome: &Outcome) {
        if let Outcome::NewProblem(problem) = outcome {
            self.header = Some(format!("Wrong! New problem: {problem} = ?"));
        }
    }
}

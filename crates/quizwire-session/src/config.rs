//! Game configuration shared by every server session.

use quizwire_protocol::MAX_MESSAGE_LEN;
use tracing::warn;

/// Operands are drawn from `1..=DEFAULT_MAX_OPERAND` unless configured.
pub const DEFAULT_MAX_OPERAND: i32 = 19;

/// Text sent with the Congratulations outcome unless configured.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Congratulations! Correct answer!";

/// Configuration for quiz sessions.
///
/// Create with `GameConfig::default()` and override the fields you care
/// about. The server calls [`GameConfig::validated`] before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Largest operand a generated problem may contain. The smallest is
    /// always 1.
    pub max_operand: i32,

    /// Text carried by the Congratulations outcome. At most
    /// [`MAX_MESSAGE_LEN`] bytes survive validation.
    pub success_message: String,

    /// How many answers a client may submit before the server gives up
    /// and closes the connection. `None` means no limit.
    pub max_attempts: Option<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_operand: DEFAULT_MAX_OPERAND,
            success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            max_attempts: None,
        }
    }
}

impl GameConfig {
    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// - `max_operand` below 1 becomes 1.
    /// - `max_attempts` of `Some(0)` becomes `None` (a session that could
    ///   never accept an answer is treated as a typo for "unlimited").
    /// - `success_message` longer than [`MAX_MESSAGE_LEN`] bytes is cut
    ///   at the last character boundary that fits.
    pub fn validated(mut self) -> Self {
        if self.max_operand < 1 {
            warn!(
                max_operand = self.max_operand,
                "max_operand must be at least 1, clamping"
            );
            self.max_operand = 1;
        }
        if self.max_attempts == Some(0) {
            warn!("max_attempts of 0 would reject every answer, treating as unlimited");
            self.max_attempts = None;
        }
        if self.success_message.len() > MAX_MESSAGE_LEN {
            warn!(
                len = self.success_message.len(),
                max = MAX_MESSAGE_LEN,
                "success_message does not fit in one frame, truncating"
            );
            let mut end = MAX_MESSAGE_LEN;
            while !self.success_message.is_char_boundary(end) {
                end -= 1;
            }
            self.success_message.truncate(end);
        }
        self
    }
}

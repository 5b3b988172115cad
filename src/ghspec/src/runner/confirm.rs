//! Confirmation before opening pull requests.

use std::io::{self, Write};

/// Asks whether to proceed with a fix.
pub trait Confirm: Send {
    /// Poses `question`, writing any prompt to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be written or the answer read.
    fn confirm(&mut self, question: &str, out: &mut (dyn Write + Send)) -> io::Result<bool>;
}

/// Approves every fix without asking.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _question: &str, _out: &mut (dyn Write + Send)) -> io::Result<bool> {
        Ok(true)
    }
}

/// Accepts `y` or `yes` in any case, ignoring surrounding whitespace.
#[must_use]
pub fn parse_yes_no(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Formats the question the way interactive prompts show it.
#[must_use]
pub fn prompt_text(question: &str) -> String {
    format!("{question} (y/n): ")
}

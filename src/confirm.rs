//! Confirmation of destructive actions (deleting a transaction, replacing the dataset on import).

use crate::Result;
use anyhow::Context;
use std::io::{self, BufRead, Write};

/// Asks the user whether a destructive action should proceed.
pub trait Confirm {
    /// Returns true if the user agreed to `question`.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Agrees to everything. Used for `--yes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Asks on stderr and reads the answer from stdin. Only `y` or `yes` (any case) agrees; an empty
/// answer or end of input declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prompt;

impl Confirm for Prompt {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let mut stderr = io::stderr();
        write!(stderr, "{question} [y/N]: ")?;
        stderr.flush().ok();
        let mut answer = String::new();
        io::stdin()
            .lock()
            .read_line(&mut answer)
            .context("Unable to read the answer from stdin")?;
        Ok(is_yes(&answer))
    }
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(self(question))
    }
}

/// Picks `AssumeYes` when `yes` is set and `Prompt` otherwise.
pub fn confirmer(yes: bool) -> Box<dyn Confirm + Send> {
    if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(Prompt)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

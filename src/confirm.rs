//! Yes/no confirmation before destructive runs.
//!
//! Apply and remove only proceed on an explicit non-interactive `--yes` or
//! an affirmative answer to a prompt. Anything else, including end of
//! input, is a decline.

use std::io::{BufRead, Write};

use anyhow::Result;

pub trait Confirm {
    /// Ask `question`; `true` only on an affirmative answer.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Non-interactive confirmation (`--yes`).
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Line-oriented prompt over any reader/writer pair.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

/// Prompt on stdout, answer from stdin.
pub fn stdin_prompt() -> Prompt<std::io::StdinLock<'static>, std::io::Stdout> {
    Prompt::new(std::io::stdin().lock(), std::io::stdout())
}

impl<R: BufRead, W: Write> Confirm for Prompt<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.output, "{} (yes/no): ", question)?;
        self.output.flush()?;
        let mut answer = String::new();
        let read = self.input.read_line(&mut answer)?;
        if read == 0 {
            writeln!(self.output)?;
            return Ok(false);
        }
        Ok(is_affirmative(&answer))
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(input: &str) -> (bool, String) {
        let mut out = Vec::new();
        let answer = Prompt::new(Cursor::new(input.as_bytes().to_vec()), &mut out)
            .confirm("Proceed?")
            .unwrap();
        (answer, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_affirmative_answers() {
        assert!(ask("yes\n").0);
        assert!(ask("Y\n").0);
        assert!(ask("  YES  \n").0);
    }

    #[test]
    fn test_everything_else_declines() {
        assert!(!ask("no\n").0);
        assert!(!ask("sure\n").0);
        assert!(!ask("\n").0);
        assert!(!ask("").0);
    }

    #[test]
    fn test_prompt_text_written() {
        let (_, out) = ask("no\n");
        assert!(out.starts_with("Proceed? (yes/no): "));
    }

    #[test]
    fn test_assume_yes() {
        assert!(AssumeYes.confirm("anything").unwrap());
    }
}

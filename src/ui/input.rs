//! Line-oriented console input.

use async_trait::async_trait;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Source of user input lines.
///
/// Both the session prompt and approval questions read through the same
/// source, so a turn holds it exclusively while it runs.
#[async_trait]
pub trait LineSource: Send {
    /// Show `prompt` and read one line without its terminator.
    /// `Ok(None)` means end of input.
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Reads lines from stdin, writing prompts to stderr.
pub struct ConsoleInput {
    lines: Lines<BufReader<Stdin>>,
}

impl ConsoleInput {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for ConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineSource for ConsoleInput {
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stderr = io::stderr();
        stderr.write_all(prompt.as_bytes())?;
        stderr.flush()?;

        match self.lines.next_line().await? {
            Some(line) => Ok(Some(strip_line_terminator(&line).to_string())),
            None => {
                eprintln!();
                Ok(None)
            }
        }
    }
}

/// `next_line` drops `\n` but leaves the `\r` of CRLF input.
fn strip_line_terminator(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// Parse a `y/n` confirmation; only `y` and `yes` approve.
pub fn parse_confirmation(input: &str) -> bool {
    let normalized = input.trim().to_ascii_lowercase();
    matches!(normalized.as_str(), "y" | "yes")
}

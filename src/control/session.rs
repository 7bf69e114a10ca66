//! The interactive read-turn loop.

use tracing::{error, info};

use super::resume::ResumeLoop;
use crate::ui::input::LineSource;
use crate::ui::render::RenderSink;

pub const WELCOME: &str = "Welcome to the chatbot! Type 'exit' to quit.";
pub const FAREWELL: &str = "Bye...";
pub const PROMPT: &str = "> ";

/// Tally of a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOutcome {
    pub turns_completed: usize,
    pub turns_failed: usize,
}

pub struct SessionLoop<'a> {
    turns: ResumeLoop<'a>,
    sink: &'a dyn RenderSink,
    input: &'a mut dyn LineSource,
}

impl<'a> SessionLoop<'a> {
    pub fn new(
        turns: ResumeLoop<'a>,
        sink: &'a dyn RenderSink,
        input: &'a mut dyn LineSource,
    ) -> Self {
        Self { turns, sink, input }
    }

    /// Read and run turns until `exit` or end of input.
    pub async fn run(&mut self) -> SessionOutcome {
        let mut outcome = SessionOutcome::default();
        self.sink.welcome(WELCOME);

        loop {
            let line = match self.input.read_line(PROMPT).await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "failed to read input");
                    self.sink.error(&format!("failed to read input: {e}"));
                    break;
                }
            };
            if is_exit(&line) {
                break;
            }

            info!(turn = outcome.turns_completed + outcome.turns_failed + 1, "turn started");
            match self.turns.run_turn(&mut *self.input, line).await {
                Ok(report) => {
                    outcome.turns_completed += 1;
                    info!(
                        passes = report.passes,
                        resumes = report.resumes.len(),
                        "turn finished"
                    );
                }
                Err(e) => {
                    outcome.turns_failed += 1;
                    error!(error = %e, "turn aborted");
                    self.sink.error(&e.to_string());
                }
            }
        }

        self.sink.farewell(FAREWELL);
        outcome
    }
}

/// Exact match ignoring case; surrounding whitespace does not count.
fn is_exit(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit")
}

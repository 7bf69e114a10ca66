//! One user turn: run passes and resume until nothing is suspended.

use tracing::debug;

use super::decision::DecisionChannel;
use super::stream::drain_pass;
use crate::catalog::AuthorizationWaiter;
use crate::engine::{EngineInput, ExecutionEngine, SessionContext};
use crate::error::EngineError;
use crate::interrupt::{Decision, ResumeCommand, Suspension};
use crate::ui::input::LineSource;
use crate::ui::render::RenderSink;

/// Where a turn stands between passes.
#[derive(Debug)]
enum TurnState {
    Running(EngineInput),
    AwaitingDecisions(Vec<Suspension>),
    Resuming(Vec<Decision>),
    Done,
}

impl TurnState {
    fn label(&self) -> &'static str {
        match self {
            Self::Running(_) => "running",
            Self::AwaitingDecisions(_) => "awaiting_decisions",
            Self::Resuming(_) => "resuming",
            Self::Done => "done",
        }
    }
}

/// What a finished turn did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    /// Engine passes opened, including the first.
    pub passes: usize,
    /// Every resume command sent, in order.
    pub resumes: Vec<ResumeCommand>,
}

/// Collaborators a turn needs besides the input source.
#[derive(Clone, Copy)]
pub struct ResumeLoop<'a> {
    engine: &'a dyn ExecutionEngine,
    waiter: &'a dyn AuthorizationWaiter,
    sink: &'a dyn RenderSink,
    session: &'a SessionContext,
}

impl<'a> ResumeLoop<'a> {
    pub fn new(
        engine: &'a dyn ExecutionEngine,
        waiter: &'a dyn AuthorizationWaiter,
        sink: &'a dyn RenderSink,
        session: &'a SessionContext,
    ) -> Self {
        Self {
            engine,
            waiter,
            sink,
            session,
        }
    }

    /// Drive one turn to completion.
    ///
    /// Engine errors abort the turn immediately; no resume is attempted
    /// after a failed pass.
    pub async fn run_turn(
        &self,
        input: &mut dyn LineSource,
        user_text: String,
    ) -> Result<TurnReport, EngineError> {
        let mut report = TurnReport::default();
        let mut channel = DecisionChannel::new(self.waiter, self.sink, input);
        let mut state = TurnState::Running(EngineInput::user_text(user_text));

        loop {
            let next = match state {
                TurnState::Running(pass_input) => {
                    report.passes += 1;
                    let suspensions =
                        drain_pass(self.engine, pass_input, self.session, self.sink).await?;
                    if suspensions.is_empty() {
                        TurnState::Done
                    } else {
                        TurnState::AwaitingDecisions(suspensions)
                    }
                }
                TurnState::AwaitingDecisions(suspensions) => {
                    TurnState::Resuming(channel.resolve_all(&suspensions).await)
                }
                TurnState::Resuming(decisions) => {
                    let command = ResumeCommand::from_decisions(decisions);
                    report.resumes.push(command.clone());
                    TurnState::Running(EngineInput::Resume(command))
                }
                TurnState::Done => return Ok(report),
            };
            debug!(
                session = %self.session,
                state = next.label(),
                passes = report.passes,
                "turn transition"
            );
            state = next;
        }
    }
}

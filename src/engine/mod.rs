//! Resumable execution engine interface.
//!
//! An engine turns one input into a lazy stream of events. A pass ends
//! either when the work is finished or right after an
//! [`EngineEvent::Interrupt`]; the caller then opens a new stream with
//! [`EngineInput::Resume`] to continue from the suspension point.

use futures_util::Stream;
use std::pin::Pin;

use crate::error::EngineError;
use crate::interrupt::{ResumeCommand, Suspension};
use crate::types::{Message, Role};

mod agent;
mod checkpoint;

pub use crate::session::SessionContext;
pub use agent::{AgentEngine, AgentSettings};
pub use checkpoint::CheckpointStore;

/// One message of fresh caller input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMessage {
    pub role: Role,
    pub content: String,
}

impl InputMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub(crate) fn into_message(self) -> Message {
        match self.role {
            Role::System => Message::system(self.content),
            Role::Assistant => Message::assistant(self.content),
            Role::User | Role::Tool => Message::user(self.content),
        }
    }
}

/// What a pass starts from.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineInput {
    /// New conversation input for a fresh turn.
    Messages(Vec<InputMessage>),
    /// Decisions for the suspensions reported by the previous pass.
    Resume(ResumeCommand),
}

impl EngineInput {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::Messages(vec![InputMessage::user(text)])
    }
}

/// One item of a pass's output.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The pass reached gated actions and will not continue on its own.
    Interrupt(Vec<Suspension>),
    /// Zero or more output messages produced by a step.
    Update(Vec<Message>),
}

pub type EventStream<'a> =
    Pin<Box<dyn Stream<Item = Result<EngineEvent, EngineError>> + Send + 'a>>;

/// A resumable, multi-step execution that can pause at gated actions.
pub trait ExecutionEngine: Send + Sync {
    /// Open one pass. Nothing runs until the stream is polled.
    fn open_stream<'a>(&'a self, input: EngineInput, session: &'a SessionContext)
        -> EventStream<'a>;
}

//! In-memory per-session checkpoints.

use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::interrupt::Suspension;
use crate::types::{Message, ToolCall};

/// Where one tool call of the current step stands.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CallState {
    /// May run as soon as no sibling call is gated.
    Ready,
    /// Waiting on the caller's decision.
    Gated(Suspension),
    /// Already answered; the message is its tool result.
    Settled(Message),
}

/// A tool call requested by the model in the step being executed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PendingCall {
    pub(crate) call: ToolCall,
    /// Catalog name, absent when the model named a tool we never offered.
    pub(crate) qualified_name: Option<String>,
    pub(crate) state: CallState,
}

impl PendingCall {
    pub(crate) fn suspension(&self) -> Option<&Suspension> {
        match &self.state {
            CallState::Gated(suspension) => Some(suspension),
            _ => None,
        }
    }
}

/// Conversation state of one session between passes.
#[derive(Debug, Clone, Default)]
pub(crate) struct Checkpoint {
    pub(crate) history: Vec<Message>,
    /// Calls of the suspended step, in the order the model issued them.
    pub(crate) pending: Vec<PendingCall>,
    /// Model calls made for the current turn, across resumes.
    pub(crate) model_calls: usize,
}

impl Checkpoint {
    pub(crate) fn is_suspended(&self) -> bool {
        self.pending.iter().any(|p| p.suspension().is_some())
    }

    /// Suspensions in issue order, one per gated call.
    pub(crate) fn suspensions(&self) -> Vec<Suspension> {
        self.pending
            .iter()
            .filter_map(PendingCall::suspension)
            .cloned()
            .collect()
    }
}

/// Checkpoints keyed by session id.
///
/// The lock is only held for the copy in or out, never across a model or
/// catalog call.
#[derive(Debug, Default)]
pub struct CheckpointStore {
    sessions: Mutex<HashMap<String, Checkpoint>>,
}

impl CheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn load(&self, session_id: &str) -> Option<Checkpoint> {
        self.sessions.lock().await.get(session_id).cloned()
    }

    pub(crate) async fn save(&self, session_id: &str, checkpoint: Checkpoint) {
        self.sessions
            .lock()
            .await
            .insert(session_id.to_string(), checkpoint);
    }

    /// True when the session has a step waiting on decisions.
    pub async fn is_suspended(&self, session_id: &str) -> bool {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .is_some_and(Checkpoint::is_suspended)
    }

    /// Number of messages recorded for the session.
    pub async fn history_len(&self, session_id: &str) -> usize {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .map_or(0, |checkpoint| checkpoint.history.len())
    }
}

//! Suspension records, decisions, and resume payloads.
//!
//! An execution pass that reaches a gated tool call stops and reports one
//! [`Suspension`] per gated call. The caller answers each with a
//! [`Decision`] and hands them back as a [`ResumeCommand`] whose shape
//! mirrors the batch: a single value for one suspension, an ordered list
//! otherwise.

use serde::{Deserialize, Serialize};

/// Opaque handle for an out-of-band consent flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationHandle {
    /// Identifier used to await completion of the flow.
    pub id: String,
    /// Location the user visits to grant consent.
    pub url: String,
}

/// One paused action, discriminated by why it paused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum Suspension {
    /// The tool needs the user to grant access to a third-party account.
    AuthorizationRequired {
        tool_name: String,
        authorization: AuthorizationHandle,
    },
    /// The tool may only run after a human approves its parameters.
    HumanApprovalRequired {
        tool_name: String,
        input: serde_json::Value,
    },
    /// Any cause this build does not know how to resolve.
    #[serde(other)]
    Unrecognized,
}

impl Suspension {
    /// Stable label for logs.
    pub fn cause(&self) -> &'static str {
        match self {
            Self::AuthorizationRequired { .. } => "authorization_required",
            Self::HumanApprovalRequired { .. } => "human_approval_required",
            Self::Unrecognized => "unrecognized",
        }
    }

    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Self::AuthorizationRequired { tool_name, .. }
            | Self::HumanApprovalRequired { tool_name, .. } => Some(tool_name),
            Self::Unrecognized => None,
        }
    }
}

/// The caller's answer to one suspension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub authorized: bool,
}

impl Decision {
    pub const fn granted() -> Self {
        Self { authorized: true }
    }

    pub const fn denied() -> Self {
        Self { authorized: false }
    }
}

/// Decisions handed back to the engine to continue a suspended pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResumeCommand {
    Single(Decision),
    Batch(Vec<Decision>),
}

impl ResumeCommand {
    /// Package decisions in suspension order.
    pub fn from_decisions(mut decisions: Vec<Decision>) -> Self {
        if decisions.len() == 1 {
            Self::Single(decisions.remove(0))
        } else {
            Self::Batch(decisions)
        }
    }

    /// Decisions in positional order regardless of shape.
    pub fn decisions(&self) -> &[Decision] {
        match self {
            Self::Single(decision) => std::slice::from_ref(decision),
            Self::Batch(decisions) => decisions,
        }
    }

    pub fn len(&self) -> usize {
        self.decisions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions().is_empty()
    }
}

//! Tool-calling agent engine backed by a chat model and a tool catalog.
//!
//! Each pass runs model steps until the model answers without tool calls.
//! Calls that need consent or approval suspend the pass; the step's calls
//! are kept in the session checkpoint until the decisions arrive.

use async_stream::stream;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::checkpoint::{CallState, Checkpoint, CheckpointStore, PendingCall};
use super::{EngineEvent, EngineInput, EventStream, ExecutionEngine, SessionContext};
use crate::api::ModelClient;
use crate::catalog::{qualified_tool_name, CatalogTool, ToolCatalog};
use crate::config::Config;
use crate::error::EngineError;
use crate::interrupt::{Decision, ResumeCommand, Suspension};
use crate::types::{ChatRequest, Message, ToolCall, ToolDefinition};

/// Per-run agent behavior resolved from configuration.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub model: String,
    pub temperature: Option<f64>,
    /// Identity tools are authorized and executed for.
    pub user_id: String,
    /// Function names that wait for a human yes/no.
    pub approval_tools: Vec<String>,
    /// Cap on model calls per user turn, counted across resumes.
    pub max_iterations: usize,
    pub system_prompt: String,
}

impl AgentSettings {
    pub fn from_config(config: &Config, system_prompt: String) -> Self {
        Self {
            model: config.model.model.clone(),
            temperature: config.model.temperature,
            user_id: config.catalog.user_id.clone(),
            approval_tools: config.catalog.approval_tools.clone(),
            max_iterations: config.agent.max_iterations.max(1),
            system_prompt,
        }
    }

    fn needs_approval(&self, function_name: &str) -> bool {
        let qualified = qualified_tool_name(function_name);
        self.approval_tools
            .iter()
            .any(|name| name == function_name || *name == qualified)
    }
}

pub struct AgentEngine {
    settings: AgentSettings,
    model: Arc<dyn ModelClient>,
    catalog: Arc<dyn ToolCatalog>,
    tools: Vec<CatalogTool>,
    checkpoints: CheckpointStore,
}

impl AgentEngine {
    pub fn new(
        settings: AgentSettings,
        model: Arc<dyn ModelClient>,
        catalog: Arc<dyn ToolCatalog>,
        tools: Vec<CatalogTool>,
    ) -> Self {
        Self {
            settings,
            model,
            catalog,
            tools,
            checkpoints: CheckpointStore::new(),
        }
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    fn tool_definitions(&self) -> Option<Vec<ToolDefinition>> {
        if self.tools.is_empty() {
            return None;
        }
        Some(self.tools.iter().map(|t| t.definition.clone()).collect())
    }

    fn qualified_name_for(&self, function_name: &str) -> Option<String> {
        self.tools
            .iter()
            .find(|tool| tool.function_name() == function_name)
            .map(|tool| tool.qualified_name.clone())
    }

    fn fresh_checkpoint(&self) -> Checkpoint {
        let mut checkpoint = Checkpoint::default();
        if !self.settings.system_prompt.trim().is_empty() {
            checkpoint
                .history
                .push(Message::system(self.settings.system_prompt.clone()));
        }
        checkpoint
    }
}

impl ExecutionEngine for AgentEngine {
    fn open_stream<'a>(
        &'a self,
        input: EngineInput,
        session: &'a SessionContext,
    ) -> EventStream<'a> {
        Box::pin(stream! {
            let mut pass = Pass::new(self, session, input);
            loop {
                match pass.advance().await {
                    Ok(Some(event)) => yield Ok(event),
                    Ok(None) => break,
                    Err(err) => {
                        yield Err(err);
                        break;
                    }
                }
            }
        })
    }
}

enum Phase {
    Start(EngineInput),
    Model,
    Finished,
}

/// State of one pass, advanced one event at a time by the stream.
struct Pass<'a> {
    engine: &'a AgentEngine,
    session: &'a SessionContext,
    checkpoint: Checkpoint,
    phase: Phase,
    queued: VecDeque<EngineEvent>,
}

impl<'a> Pass<'a> {
    fn new(engine: &'a AgentEngine, session: &'a SessionContext, input: EngineInput) -> Self {
        Self {
            engine,
            session,
            checkpoint: Checkpoint::default(),
            phase: Phase::Start(input),
            queued: VecDeque::new(),
        }
    }

    fn session_id(&self) -> &str {
        self.session.session_id()
    }

    async fn advance(&mut self) -> Result<Option<EngineEvent>, EngineError> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                return Ok(Some(event));
            }
            match std::mem::replace(&mut self.phase, Phase::Finished) {
                Phase::Start(input) => self.start(input).await?,
                Phase::Model => self.model_step().await?,
                Phase::Finished => return Ok(None),
            }
        }
    }

    async fn start(&mut self, input: EngineInput) -> Result<(), EngineError> {
        let stored = self.engine.checkpoints.load(self.session_id()).await;
        match input {
            EngineInput::Messages(messages) => {
                let mut checkpoint = stored.unwrap_or_else(|| self.engine.fresh_checkpoint());
                // An abandoned suspension still owes the model tool results.
                for pending in std::mem::take(&mut checkpoint.pending) {
                    let content = match pending.state {
                        CallState::Settled(message) => {
                            checkpoint.history.push(message);
                            continue;
                        }
                        _ => format!(
                            "The call to {} was cancelled before it ran.",
                            pending.call.function.name
                        ),
                    };
                    checkpoint
                        .history
                        .push(Message::tool_result(pending.call.id, content));
                }
                checkpoint
                    .history
                    .extend(messages.into_iter().map(|m| m.into_message()));
                checkpoint.model_calls = 0;
                info!(session = %self.session, "starting turn");
                self.checkpoint = checkpoint;
                self.save().await;
                self.phase = Phase::Model;
            }
            EngineInput::Resume(command) => {
                let checkpoint = match stored {
                    Some(checkpoint) if checkpoint.is_suspended() => checkpoint,
                    _ => return Err(EngineError::NoCheckpoint(self.session_id().to_string())),
                };
                self.checkpoint = checkpoint;
                self.resume(command).await?;
            }
        }
        Ok(())
    }

    /// Apply decisions positionally to the gated calls of the suspended step.
    async fn resume(&mut self, command: ResumeCommand) -> Result<(), EngineError> {
        let expected = self.checkpoint.suspensions().len();
        let decisions = command.decisions();
        if decisions.len() != expected {
            return Err(EngineError::ResumeMismatch {
                expected,
                received: decisions.len(),
            });
        }
        debug!(session = %self.session, count = expected, "applying decisions");

        let mut decisions = decisions.iter().copied();
        let mut pending = std::mem::take(&mut self.checkpoint.pending);
        for call in pending.iter_mut() {
            let CallState::Gated(suspension) = &call.state else {
                continue;
            };
            let decision = decisions.next().unwrap_or(Decision::denied());
            call.state = self.after_decision(&call.call, suspension, decision);
        }
        self.checkpoint.pending = pending;
        self.settle_step().await
    }

    fn after_decision(
        &self,
        call: &ToolCall,
        suspension: &Suspension,
        decision: Decision,
    ) -> CallState {
        let name = &call.function.name;
        match (suspension, decision.authorized) {
            (Suspension::AuthorizationRequired { .. }, true) => {
                if self.engine.settings.needs_approval(name) {
                    CallState::Gated(approval_suspension(call))
                } else {
                    CallState::Ready
                }
            }
            (Suspension::HumanApprovalRequired { .. }, true) => CallState::Ready,
            (Suspension::AuthorizationRequired { .. }, false) => CallState::Settled(
                Message::tool_result(
                    &call.id,
                    format!("Authorization for {name} was not granted."),
                ),
            ),
            _ => CallState::Settled(Message::tool_result(
                &call.id,
                format!("The user denied permission to run {name}."),
            )),
        }
    }

    async fn model_step(&mut self) -> Result<(), EngineError> {
        if self.checkpoint.model_calls >= self.engine.settings.max_iterations {
            self.save().await;
            return Err(EngineError::MaxIterationsReached);
        }
        self.checkpoint.model_calls += 1;

        let request = ChatRequest {
            model: self.engine.settings.model.clone(),
            messages: self.checkpoint.history.clone(),
            tools: self.engine.tool_definitions(),
            temperature: self.engine.settings.temperature,
        };
        let response = self.engine.model.chat(&request).await?;
        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(EngineError::EmptyResponse)?;

        self.checkpoint.history.push(message.clone());
        let calls = message.tool_calls.clone().unwrap_or_default();
        if !message.is_empty() {
            self.queued.push_back(EngineEvent::Update(vec![message]));
        }
        if calls.is_empty() {
            debug!(
                session = %self.session,
                model_calls = self.checkpoint.model_calls,
                "pass finished"
            );
            self.save().await;
            return Ok(());
        }

        let mut pending = Vec::with_capacity(calls.len());
        for call in calls {
            pending.push(self.gate(call).await?);
        }
        self.checkpoint.pending = pending;
        self.settle_step().await
    }

    /// Decide whether one requested call may run immediately.
    async fn gate(&self, call: ToolCall) -> Result<PendingCall, EngineError> {
        let name = call.function.name.clone();
        let Some(qualified_name) = self.engine.qualified_name_for(&name) else {
            warn!(tool = %name, "model requested an unknown tool");
            let result = Message::tool_result(&call.id, format!("Error: unknown tool `{name}`."));
            return Ok(PendingCall {
                call,
                qualified_name: None,
                state: CallState::Settled(result),
            });
        };

        let authorization = self
            .engine
            .catalog
            .authorize(&qualified_name, &self.engine.settings.user_id)
            .await?;
        let state = if let Some(handle) = authorization.handle() {
            CallState::Gated(Suspension::AuthorizationRequired {
                tool_name: name.clone(),
                authorization: handle,
            })
        } else if !authorization.is_completed() {
            CallState::Settled(Message::tool_result(
                &call.id,
                format!("Error: authorization for {name} is unavailable."),
            ))
        } else if self.engine.settings.needs_approval(&name) {
            CallState::Gated(approval_suspension(&call))
        } else {
            CallState::Ready
        };
        Ok(PendingCall {
            call,
            qualified_name: Some(qualified_name),
            state,
        })
    }

    /// Suspend if any call of the step is gated, otherwise run the ready
    /// calls and record every result in issue order.
    async fn settle_step(&mut self) -> Result<(), EngineError> {
        if self.checkpoint.is_suspended() {
            let suspensions = self.checkpoint.suspensions();
            debug!(session = %self.session, count = suspensions.len(), "suspending pass");
            self.save().await;
            self.queued.push_back(EngineEvent::Interrupt(suspensions));
            self.phase = Phase::Finished;
            return Ok(());
        }

        let pending = std::mem::take(&mut self.checkpoint.pending);
        let mut results = Vec::with_capacity(pending.len());
        for call in pending {
            let message = match &call.state {
                CallState::Settled(message) => message.clone(),
                CallState::Ready => self.execute(&call).await,
                CallState::Gated(_) => {
                    Message::tool_result(&call.call.id, "Error: call was not approved.")
                }
            };
            results.push(message);
        }
        self.checkpoint.history.extend(results.iter().cloned());
        self.save().await;
        if !results.is_empty() {
            self.queued.push_back(EngineEvent::Update(results));
        }
        self.phase = Phase::Model;
        Ok(())
    }

    /// Run one call through the catalog. Tool failures go back to the
    /// model as the tool result.
    async fn execute(&self, pending: &PendingCall) -> Message {
        let call = &pending.call;
        let Some(qualified_name) = pending.qualified_name.as_deref() else {
            return Message::tool_result(&call.id, "Error: tool is not available.");
        };
        let input = call.parsed_arguments();
        match self
            .engine
            .catalog
            .execute(qualified_name, &input, &self.engine.settings.user_id)
            .await
        {
            Ok(output) => {
                debug!(tool = qualified_name, failed = output.error.is_some(), "tool executed");
                Message::tool_result(&call.id, output.to_tool_content())
            }
            Err(err) => {
                warn!(tool = qualified_name, error = %err, "tool execution failed");
                Message::tool_result(&call.id, format!("Error: {err}"))
            }
        }
    }

    async fn save(&self) {
        self.engine
            .checkpoints
            .save(self.session_id(), self.checkpoint.clone())
            .await;
    }
}

fn approval_suspension(call: &ToolCall) -> Suspension {
    Suspension::HumanApprovalRequired {
        tool_name: call.function.name.clone(),
        input: call.parsed_arguments(),
    }
}

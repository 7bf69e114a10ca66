//! Shared test fixtures for engine and control-loop test modules.
//!
//! Every fixture records what it was asked to do so tests can assert on the
//! conversation afterwards instead of on terminal output.

use async_trait::async_trait;
use futures_util::stream;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Mutex;

use crate::api::ModelClient;
use crate::catalog::{
    AuthorizationResponse, AuthorizationStatus, AuthorizationWaiter, CatalogTool, ToolCatalog,
    ToolOutput, ToolQuery,
};
use crate::engine::{EngineEvent, EngineInput, EventStream, ExecutionEngine, SessionContext};
use crate::error::{ApiError, CatalogError, EngineError};
use crate::interrupt::AuthorizationHandle;
use crate::types::{
    ChatRequest, ChatResponse, Choice, FunctionDefinition, Message, ToolCall, ToolDefinition,
};
use crate::ui::input::LineSource;
use crate::ui::render::RenderSink;

/// Model client that replays canned responses in order.
pub struct MockModelClient {
    replies: Mutex<VecDeque<ChatResponse>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockModelClient {
    pub fn new(replies: Vec<ChatResponse>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::InvalidResponse("no scripted reply left".into()))
    }
}

/// In-memory catalog. Tools are authorized unless told otherwise.
#[derive(Default)]
pub struct MockCatalog {
    statuses: Mutex<HashMap<String, AuthorizationStatus>>,
    executed: Mutex<Vec<(String, serde_json::Value)>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_authorization(&self, qualified_name: &str, status: AuthorizationStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(qualified_name.to_string(), status);
    }

    /// `(qualified tool name, input)` for each execution, in order.
    pub fn executed(&self) -> Vec<(String, serde_json::Value)> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolCatalog for MockCatalog {
    async fn discover(&self, _query: &ToolQuery) -> Result<Vec<CatalogTool>, CatalogError> {
        Ok(vec![x_tool("PostTweet"), x_tool("LookupTweetById")])
    }

    async fn authorize(
        &self,
        tool_name: &str,
        _user_id: &str,
    ) -> Result<AuthorizationResponse, CatalogError> {
        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(tool_name)
            .copied()
            .unwrap_or(AuthorizationStatus::Completed);
        Ok(AuthorizationResponse {
            id: format!("auth-{tool_name}"),
            url: Some(format!("https://consent.example/{tool_name}")),
            status,
        })
    }

    async fn execute(
        &self,
        tool_name: &str,
        input: &serde_json::Value,
        _user_id: &str,
    ) -> Result<ToolOutput, CatalogError> {
        self.executed
            .lock()
            .unwrap()
            .push((tool_name.to_string(), input.clone()));
        Ok(ToolOutput::value(json!({ "ok": true, "tool": tool_name })))
    }
}

/// `X_<name>` tool as the catalog would format it.
pub fn x_tool(name: &str) -> CatalogTool {
    CatalogTool::from_definition(ToolDefinition {
        tool_type: "function".to_string(),
        function: FunctionDefinition {
            name: format!("X_{name}"),
            description: format!("{name} on X."),
            parameters: json!({ "type": "object", "properties": {} }),
        },
    })
}

fn reply(message: Message) -> ChatResponse {
    ChatResponse {
        id: "resp".to_string(),
        choices: vec![Choice {
            index: 0,
            message,
            finish_reason: Some("stop".to_string()),
        }],
        usage: None,
    }
}

pub fn assistant_reply(text: &str) -> ChatResponse {
    reply(Message::assistant(text))
}

/// Assistant turn carrying `(id, function name, json arguments)` calls.
pub fn tool_call_reply(calls: &[(&str, &str, &str)]) -> ChatResponse {
    let mut message = Message::assistant("");
    message.content = None;
    message.tool_calls = Some(
        calls
            .iter()
            .map(|(id, name, args)| ToolCall::function(*id, *name, *args))
            .collect(),
    );
    reply(message)
}

/// Engine that replays one scripted event list per opened pass.
#[derive(Default)]
pub struct ScriptedEngine {
    passes: Mutex<VecDeque<Vec<Result<EngineEvent, EngineError>>>>,
    inputs: Mutex<Vec<EngineInput>>,
}

impl ScriptedEngine {
    pub fn new(passes: Vec<Vec<Result<EngineEvent, EngineError>>>) -> Self {
        Self {
            passes: Mutex::new(passes.into()),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Inputs of every opened pass, in order.
    pub fn inputs(&self) -> Vec<EngineInput> {
        self.inputs.lock().unwrap().clone()
    }
}

impl ExecutionEngine for ScriptedEngine {
    fn open_stream<'a>(
        &'a self,
        input: EngineInput,
        _session: &'a SessionContext,
    ) -> EventStream<'a> {
        self.inputs.lock().unwrap().push(input);
        let events = self.passes.lock().unwrap().pop_front().unwrap_or_default();
        Box::pin(stream::iter(events))
    }
}

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Welcome(String),
    Farewell(String),
    Message(Message),
    Activity(String),
    Detail(String),
    Approval(String),
    Warn(String),
    Error(String),
}

#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<Rendered>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Rendered> {
        self.calls.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Rendered::Message(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Rendered::Error(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    /// Text of activity lines, in order.
    pub fn activities(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Rendered::Activity(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: Rendered) {
        self.calls.lock().unwrap().push(call);
    }
}

impl RenderSink for RecordingSink {
    fn welcome(&self, text: &str) {
        self.push(Rendered::Welcome(text.to_string()));
    }

    fn farewell(&self, text: &str) {
        self.push(Rendered::Farewell(text.to_string()));
    }

    fn assistant_message(&self, message: &Message) {
        self.push(Rendered::Message(message.clone()));
    }

    fn activity(&self, text: &str) {
        self.push(Rendered::Activity(text.to_string()));
    }

    fn detail(&self, text: &str) {
        self.push(Rendered::Detail(text.to_string()));
    }

    fn approval_block(&self, text: &str) {
        self.push(Rendered::Approval(text.to_string()));
    }

    fn warn(&self, msg: &str) {
        self.push(Rendered::Warn(msg.to_string()));
    }

    fn error(&self, msg: &str) {
        self.push(Rendered::Error(msg.to_string()));
    }
}

/// Line source fed from a script; end of input once the script runs out.
#[derive(Default)]
pub struct ScriptedInput {
    lines: VecDeque<io::Result<Option<String>>>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| Ok(Some(l.to_string()))).collect(),
            prompts: Vec::new(),
        }
    }

    /// Queue a read failure after the scripted lines.
    pub fn then_error(mut self) -> Self {
        self.lines
            .push_back(Err(io::Error::new(io::ErrorKind::Other, "stdin closed")));
        self
    }

    /// Prompts shown so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

#[async_trait]
impl LineSource for ScriptedInput {
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        self.lines.pop_front().unwrap_or(Ok(None))
    }
}

/// Authorization waiter with scripted outcomes; succeeds once they run out.
#[derive(Default)]
pub struct StubAuthWaiter {
    outcomes: Mutex<VecDeque<Result<(), CatalogError>>>,
    waited: Mutex<Vec<AuthorizationHandle>>,
}

impl StubAuthWaiter {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn with_outcomes(outcomes: Vec<Result<(), CatalogError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            waited: Mutex::new(Vec::new()),
        }
    }

    pub fn waited(&self) -> Vec<AuthorizationHandle> {
        self.waited.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthorizationWaiter for StubAuthWaiter {
    async fn wait_for_completion(&self, handle: &AuthorizationHandle) -> Result<(), CatalogError> {
        self.waited.lock().unwrap().push(handle.clone());
        self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

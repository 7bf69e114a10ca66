//! Fixtures for end-to-end session tests.
//!
//! Everything here goes through the crate's public traits only: a scripted
//! line source, a recording sink, a scripted model, and an in-memory tool
//! catalog that doubles as the authorization waiter.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Mutex;

use tollgate::api::ModelClient;
use tollgate::catalog::{
    AuthorizationResponse, AuthorizationStatus, AuthorizationWaiter, CatalogTool, ToolCatalog,
    ToolOutput, ToolQuery,
};
use tollgate::error::{ApiError, CatalogError};
use tollgate::interrupt::AuthorizationHandle;
use tollgate::types::{
    ChatRequest, ChatResponse, Choice, FunctionDefinition, Message, ToolCall, ToolDefinition,
};
use tollgate::ui::input::LineSource;
use tollgate::ui::render::RenderSink;

/// Lines typed by the "user"; end of input afterwards.
pub struct Keyboard {
    lines: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl Keyboard {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            prompts: Vec::new(),
        }
    }
}

#[async_trait]
impl LineSource for Keyboard {
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}

/// Flattened transcript of everything rendered, one string per call.
#[derive(Default)]
pub struct Transcript {
    lines: Mutex<Vec<String>>,
}

impl Transcript {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    fn push(&self, kind: &str, text: &str) {
        self.lines.lock().unwrap().push(format!("{kind}: {text}"));
    }
}

impl RenderSink for Transcript {
    fn welcome(&self, text: &str) {
        self.push("welcome", text);
    }
    fn farewell(&self, text: &str) {
        self.push("farewell", text);
    }
    fn assistant_message(&self, message: &Message) {
        self.push(message.role.as_str(), &message.display_text());
    }
    fn activity(&self, text: &str) {
        self.push("activity", text);
    }
    fn detail(&self, text: &str) {
        self.push("detail", text);
    }
    fn approval_block(&self, text: &str) {
        self.push("approval", text);
    }
    fn warn(&self, msg: &str) {
        self.push("warning", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
}

/// Model that replays canned replies and remembers each request.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ChatResponse, ApiError>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<ChatResponse>) -> Self {
        Self::with_failures(replies.into_iter().map(Ok).collect())
    }

    pub fn with_failures(replies: Vec<Result<ChatResponse, ApiError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::InvalidResponse("model script exhausted".into())))
    }
}

/// In-memory X toolkit. Tools are authorized unless marked pending; a
/// pending authorization completes (or fails) when waited on.
#[derive(Default)]
pub struct FakeX {
    pending: Mutex<HashMap<String, bool>>,
    pub executed: Mutex<Vec<(String, serde_json::Value)>>,
}

impl FakeX {
    /// Mark `qualified_name` as needing consent; `grant` decides the outcome.
    pub fn require_consent(&self, qualified_name: &str, grant: bool) {
        self.pending
            .lock()
            .unwrap()
            .insert(qualified_name.to_string(), grant);
    }

    pub fn executed(&self) -> Vec<(String, serde_json::Value)> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolCatalog for FakeX {
    async fn discover(&self, _query: &ToolQuery) -> Result<Vec<CatalogTool>, CatalogError> {
        Ok(vec![
            x_tool("PostTweet"),
            x_tool("LookupTweetById"),
            x_tool("DeleteTweetById"),
        ])
    }

    async fn authorize(
        &self,
        tool_name: &str,
        _user_id: &str,
    ) -> Result<AuthorizationResponse, CatalogError> {
        let pending = self.pending.lock().unwrap().contains_key(tool_name);
        Ok(AuthorizationResponse {
            id: tool_name.to_string(),
            url: Some(format!("https://consent.example/{tool_name}")),
            status: if pending {
                AuthorizationStatus::Pending
            } else {
                AuthorizationStatus::Completed
            },
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
        Ok(ToolOutput::value(json!({ "id": "1850000000000000000" })))
    }
}

#[async_trait]
impl AuthorizationWaiter for FakeX {
    async fn wait_for_completion(&self, handle: &AuthorizationHandle) -> Result<(), CatalogError> {
        let grant = self.pending.lock().unwrap().remove(&handle.id);
        match grant {
            Some(true) | None => Ok(()),
            Some(false) => Err(CatalogError::AuthorizationFailed(
                "user declined consent".into(),
            )),
        }
    }
}

pub fn x_tool(name: &str) -> CatalogTool {
    CatalogTool::from_definition(ToolDefinition {
        tool_type: "function".to_string(),
        function: FunctionDefinition {
            name: format!("X_{name}"),
            description: String::new(),
            parameters: json!({ "type": "object" }),
        },
    })
}

fn reply(message: Message) -> ChatResponse {
    ChatResponse {
        id: String::new(),
        choices: vec![Choice {
            index: 0,
            message,
            finish_reason: None,
        }],
        usage: None,
    }
}

/// Upstream failure as the HTTP client would report it.
pub fn upstream_down() -> ApiError {
    ApiError::Status {
        code: 503,
        body: "upstream unavailable".into(),
        retry_after_secs: None,
    }
}

pub fn says(text: &str) -> ChatResponse {
    reply(Message::assistant(text))
}

pub fn calls(calls: &[(&str, &str, &str)]) -> ChatResponse {
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

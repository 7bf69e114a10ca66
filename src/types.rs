//! Chat-completions wire types.
//!
//! These serialize directly to the JSON shapes OpenAI-compatible endpoints
//! expect, and double as the engine's conversation history.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Conversation participant role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// A single message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,

    /// Text content. Null when the assistant message is purely tool calls.
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    /// When role == Tool, the id of the tool call this result answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Provider-specific fields echoed back verbatim on follow-up requests.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Message {
    fn with_role(role: Role, content: Option<String>) -> Self {
        Self {
            role,
            content,
            tool_calls: None,
            tool_call_id: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, Some(content.into()))
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, Some(content.into()))
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, Some(content.into()))
    }

    /// Tool result sent back after a tool call was executed or refused.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut message = Self::with_role(Role::Tool, Some(content.into()));
        message.tool_call_id = Some(tool_call_id.into());
        message
    }

    /// True when the message carries neither text nor tool calls.
    pub fn is_empty(&self) -> bool {
        self.content
            .as_deref()
            .map_or(true, |text| text.trim().is_empty())
            && self.tool_calls.as_ref().map_or(true, Vec::is_empty)
    }

    /// Human-readable rendering used for streamed output fragments.
    pub fn display_text(&self) -> String {
        let mut out = String::new();
        if let Some(text) = self.content.as_deref().map(str::trim) {
            out.push_str(text);
        }
        for call in self.tool_calls.iter().flatten() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!(
                "tool call: {}({})",
                call.function.name, call.function.arguments
            ));
        }
        out
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String, // "function"
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    /// Arguments decoded as JSON; empty or malformed text becomes `{}`.
    pub fn parsed_arguments(&self) -> serde_json::Value {
        serde_json::from_str(&self.function.arguments)
            .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()))
    }
}

/// The function name and JSON-encoded arguments within a tool call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded string of the arguments object.
    pub arguments: String,
}

/// Tool definition included in requests so the model knows what's available.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String, // "function"
    pub function: FunctionDefinition,
}

/// The schema of a callable function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON Schema object describing the parameters.
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// Request body for POST /chat/completions.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Response body from POST /chat/completions.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// A single choice in the API response.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: Message,
    pub finish_reason: Option<String>,
}

/// Token usage reported by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_chat_request_omits_absent_options() {
        let req = ChatRequest {
            model: "gpt-4o".into(),
            messages: vec![Message::system("You are helpful."), Message::user("Hi")],
            tools: None,
            temperature: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
        assert!(json.get("temperature").is_none());
        assert!(json.get("tools").is_none());
        assert!(json["messages"][1].get("tool_calls").is_none());
    }

    #[test]
    fn deserialize_tool_call_response() {
        let json = r#"{
            "id": "chatcmpl-456",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "X_PostTweet",
                            "arguments": "{\"tweet_text\":\"hello\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        let msg = &resp.choices[0].message;
        assert!(msg.content.is_none());
        let calls = msg.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "X_PostTweet");
        assert_eq!(calls[0].parsed_arguments()["tweet_text"], "hello");
    }

    #[test]
    fn provider_specific_fields_survive_a_round_trip() {
        let json = r#"{
            "role": "assistant",
            "content": "ok",
            "reasoning_content": "thinking trace"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        let out = serde_json::to_value(&msg).unwrap();
        assert_eq!(out["reasoning_content"], "thinking trace");
    }

    #[test]
    fn malformed_arguments_decode_to_empty_object() {
        let call = ToolCall::function("call_1", "X_LookupTweetById", "{not json");
        assert_eq!(call.parsed_arguments(), serde_json::json!({}));
    }

    #[test]
    fn display_text_lists_tool_calls_after_content() {
        let mut msg = Message::assistant("Posting now.");
        msg.tool_calls = Some(vec![ToolCall::function(
            "call_1",
            "X_PostTweet",
            r#"{"tweet_text":"hi"}"#,
        )]);
        assert_eq!(
            msg.display_text(),
            "Posting now.\ntool call: X_PostTweet({\"tweet_text\":\"hi\"})"
        );
        assert!(!msg.is_empty());
        assert!(Message::with_role(Role::Assistant, None).is_empty());
    }

    #[test]
    fn tool_result_constructor_links_call_id() {
        let tool = Message::tool_result("call_1", "result data");
        assert_eq!(tool.role, Role::Tool);
        assert_eq!(tool.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool.role.as_str(), "tool");
    }
}

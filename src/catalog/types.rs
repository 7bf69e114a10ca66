//! Tool catalog data model.

use serde::{Deserialize, Serialize};

use crate::interrupt::AuthorizationHandle;
use crate::types::ToolDefinition;

/// Which tools to fetch and on whose behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolQuery {
    pub toolkits: Vec<String>,
    pub tools: Vec<String>,
    pub user_id: String,
    pub limit: usize,
}

/// One tool as offered to the model, plus the name the catalog knows it by.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTool {
    /// Catalog form, e.g. `X.PostTweet`.
    pub qualified_name: String,
    pub definition: ToolDefinition,
}

impl CatalogTool {
    pub fn from_definition(definition: ToolDefinition) -> Self {
        Self {
            qualified_name: qualified_tool_name(&definition.function.name),
            definition,
        }
    }

    /// Model-function form, e.g. `X_PostTweet`.
    pub fn function_name(&self) -> &str {
        &self.definition.function.name
    }
}

/// State of a tool authorization as reported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationStatus {
    Pending,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Reply to an authorization request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorizationResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    pub status: AuthorizationStatus,
}

impl AuthorizationResponse {
    pub fn is_completed(&self) -> bool {
        self.status == AuthorizationStatus::Completed
    }

    /// Handle for awaiting the consent flow; `None` when nothing is pending.
    pub fn handle(&self) -> Option<AuthorizationHandle> {
        if self.is_completed() || self.id.is_empty() {
            return None;
        }
        Some(AuthorizationHandle {
            id: self.id.clone(),
            url: self.url.clone().unwrap_or_default(),
        })
    }
}

/// Result of executing a tool through the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub value: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl ToolOutput {
    pub fn value(value: serde_json::Value) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            value: None,
            error: Some(message.into()),
        }
    }

    /// Text sent back to the model as the tool result.
    pub fn to_tool_content(&self) -> String {
        if let Some(error) = &self.error {
            return format!("Error: {error}");
        }
        match &self.value {
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(value) => value.to_string(),
            None => "(no output)".to_string(),
        }
    }
}

/// `X_PostTweet` -> `X.PostTweet`. Only the first separator belongs to the
/// toolkit prefix.
pub fn qualified_tool_name(function_name: &str) -> String {
    if function_name.contains('.') {
        return function_name.to_string();
    }
    function_name.replacen('_', ".", 1)
}

//! Configuration data model.
//!
//! `FileConfig` mirrors the TOML layout, including key-source indirections
//! like `api_key_env`. `Config` is the resolved runtime view handed to the
//! rest of the crate.

use serde::Deserialize;

use super::defaults::{
    default_approval_tools, default_toolkits, DEFAULT_AUTH_POLL_SECS, DEFAULT_AUTH_TIMEOUT_SECS,
    DEFAULT_CATALOG_BASE_URL,
    DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL_BASE_URL, DEFAULT_MODEL_TIMEOUT_SECS,
    DEFAULT_TOOL_LIMIT,
};

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub model: ModelConfig,
    pub catalog: CatalogConfig,
    pub agent: AgentConfig,
    pub session: SessionConfig,
    pub display: DisplayConfig,
}

/// Resolved model API connection settings.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub base_url: String,
    pub api_key: String,
    /// Provider model id. Required; there is no built-in default.
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: Option<f64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MODEL_BASE_URL.to_string(),
            api_key: String::new(),
            model: String::new(),
            timeout_secs: DEFAULT_MODEL_TIMEOUT_SECS,
            temperature: None,
        }
    }
}

/// Resolved tool catalog settings.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: String,
    /// Identity on whose behalf tools are authorized and executed.
    pub user_id: String,
    pub toolkits: Vec<String>,
    /// Individually named tools fetched in addition to whole toolkits.
    pub tools: Vec<String>,
    pub limit: usize,
    /// Model-facing tool names that need a human yes/no before running.
    pub approval_tools: Vec<String>,
    pub auth_poll_secs: u64,
    /// Give up on a consent flow after this many seconds; 0 means never.
    pub auth_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            api_key: String::new(),
            user_id: String::new(),
            toolkits: default_toolkits(),
            tools: Vec::new(),
            limit: DEFAULT_TOOL_LIMIT,
            approval_tools: default_approval_tools(),
            auth_poll_secs: DEFAULT_AUTH_POLL_SECS,
            auth_timeout_secs: DEFAULT_AUTH_TIMEOUT_SECS,
        }
    }
}

/// Agent behavior settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Extra operator instructions appended to the built-in system prompt.
    pub system_prompt: String,
    pub max_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Session identity. An empty id means "generate one at startup".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub id: String,
}

/// Display / rendering preferences.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
    /// Show dim activity lines when the agent calls tools.
    pub show_tool_calls: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_tool_calls: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct FileConfig {
    pub(super) model: ModelSection,
    pub(super) catalog: CatalogSection,
    pub(super) agent: AgentConfig,
    pub(super) session: SessionConfig,
    pub(super) display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(super) struct ModelSection {
    pub(super) base_url: String,
    pub(super) api_key: String,
    pub(super) api_key_env: Option<String>,
    pub(super) model: String,
    pub(super) timeout_secs: u64,
    pub(super) temperature: Option<f64>,
}

impl Default for ModelSection {
    fn default() -> Self {
        let model = ModelConfig::default();
        Self {
            base_url: model.base_url,
            api_key: String::new(),
            api_key_env: None,
            model: model.model,
            timeout_secs: model.timeout_secs,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(super) struct CatalogSection {
    pub(super) base_url: String,
    pub(super) api_key: String,
    pub(super) api_key_env: Option<String>,
    pub(super) user_id: String,
    pub(super) toolkits: Vec<String>,
    pub(super) tools: Vec<String>,
    pub(super) limit: usize,
    pub(super) approval_tools: Vec<String>,
    pub(super) auth_poll_secs: u64,
    pub(super) auth_timeout_secs: u64,
}

impl Default for CatalogSection {
    fn default() -> Self {
        let catalog = CatalogConfig::default();
        Self {
            base_url: catalog.base_url,
            api_key: String::new(),
            api_key_env: None,
            user_id: String::new(),
            toolkits: catalog.toolkits,
            tools: catalog.tools,
            limit: catalog.limit,
            approval_tools: catalog.approval_tools,
            auth_poll_secs: catalog.auth_poll_secs,
            auth_timeout_secs: catalog.auth_timeout_secs,
        }
    }
}

/// Diagnostics captured while resolving runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigDiagnostics {
    /// Where the file layer came from, for the startup log line.
    pub source: String,
    /// Alias env vars that were honored because the canonical one was unset.
    pub aliases_used: Vec<String>,
}

/// Configuration payload plus load-time diagnostics.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub diagnostics: ConfigDiagnostics,
}

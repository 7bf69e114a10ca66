//! Default configuration constants.

/// Default OpenAI-compatible API base URL.
pub(super) const DEFAULT_MODEL_BASE_URL: &str = "https://api.openai.com/v1";
/// Default timeout for model API requests.
pub(super) const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 120;
/// Default tool catalog endpoint.
pub(super) const DEFAULT_CATALOG_BASE_URL: &str = "https://api.arcade.dev";
/// Maximum number of tool definitions fetched from the catalog.
pub(super) const DEFAULT_TOOL_LIMIT: usize = 100;
/// Server-side wait per authorization status poll.
pub(super) const DEFAULT_AUTH_POLL_SECS: u64 = 45;
/// Overall limit on one consent flow; 0 waits until the platform gives up.
pub(super) const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 15 * 60;
/// Safety cap on tool-calling loop iterations per turn.
pub(super) const DEFAULT_MAX_ITERATIONS: usize = 20;
/// Env var consulted for the catalog key when neither `api_key` nor
/// `api_key_env` is configured.
pub(super) const DEFAULT_CATALOG_KEY_ENV: &str = "ARCADE_API_KEY";

pub(super) fn default_toolkits() -> Vec<String> {
    vec!["X".to_string()]
}

/// Tools that change account state and therefore wait for a human yes/no.
pub(super) fn default_approval_tools() -> Vec<String> {
    ["X_PostTweet", "X_ReplyToTweet", "X_DeleteTweetById"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

//! Retrying client for OpenAI-compatible chat completions.

mod retry;

use super::completions;
use super::ModelClient;
use crate::config::ModelConfig;
use crate::error::ApiError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use retry::RetryPolicy;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Client for OpenAI-compatible model APIs.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retry_policy: RetryPolicy,
}

impl ApiClient {
    /// Build a client from resolved model configuration.
    pub fn new(config: &ModelConfig) -> Self {
        Self::new_with_retry_policy(
            config,
            Duration::from_secs(config.timeout_secs),
            RetryPolicy::default(),
        )
    }

    fn new_with_retry_policy(
        config: &ModelConfig,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Self {
        // Fall back to reqwest defaults if the builder rejects the settings.
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
            retry_policy,
        }
    }

    /// Send a chat request, retrying transient failures.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let bearer = (!self.api_key.is_empty()).then_some(self.api_key.as_str());
        let mut attempt: u32 = 0;
        loop {
            match completions::request(&self.http, &self.base_url, request, bearer).await {
                Ok(response) => {
                    debug!(attempt, id = %response.id, "chat completion received");
                    return Ok(response);
                }
                Err(err) => {
                    if !self.retry_policy.should_retry(&err, attempt) {
                        return Err(err);
                    }
                    let delay = self.retry_policy.retry_delay_for(attempt, &err);
                    warn!(attempt, ?delay, error = %err, "retrying chat completion");
                    attempt = attempt.saturating_add(1);
                    sleep(delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl ModelClient for ApiClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        ApiClient::chat(self, request).await
    }
}

//! HTTP client for OpenAI-compatible chat APIs.
//!
//! - `completions`: one `/chat/completions` round trip
//! - `client`: retrying facade used by the agent engine

use crate::error::ApiError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::SystemTime;

mod client;
mod completions;

pub use client::ApiClient;

/// Minimal model API interface used by the agent engine.
///
/// Tests provide scripted responses through this trait while the binary
/// uses [`ApiClient`].
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError>;
}

/// Read `Retry-After` as whole seconds from now.
///
/// Accepts both delta-seconds and HTTP-date forms; dates in the past
/// yield zero.
pub(crate) fn parse_retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(secs);
    }
    let when = httpdate::parse_http_date(raw).ok()?;
    Some(
        when.duration_since(SystemTime::now())
            .map(|delta| delta.as_secs())
            .unwrap_or(0),
    )
}

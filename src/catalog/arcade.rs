//! HTTP client for the Arcade tool platform.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use super::types::{
    AuthorizationResponse, AuthorizationStatus, CatalogTool, ToolOutput, ToolQuery,
};
use super::{AuthorizationWaiter, ToolCatalog};
use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::interrupt::AuthorizationHandle;
use crate::types::ToolDefinition;

/// Pause between status polls that come back still pending.
const AUTH_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Shared HTTP timeout for short catalog requests.
const CATALOG_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct FormattedToolsPage {
    #[serde(default)]
    items: Vec<ToolDefinition>,
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    #[serde(default)]
    output: Option<ExecuteOutput>,
    #[serde(default = "default_success")]
    success: bool,
}

#[derive(Debug, Deserialize)]
struct ExecuteOutput {
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<ExecuteErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ExecuteErrorBody {
    #[serde(default)]
    message: String,
}

fn default_success() -> bool {
    true
}

/// Catalog client for `/v1/formatted_tools`, `/v1/tools/*`, and `/v1/auth/status`.
pub struct ArcadeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    /// Seconds the server may hold each status poll open.
    poll_wait_secs: u64,
    poll_interval: Duration,
    /// `None` waits for as long as the platform keeps the flow open.
    wait_timeout: Option<Duration>,
}

impl ArcadeClient {
    pub fn new(config: &CatalogConfig) -> Self {
        // The status long-poll must outlive the server-side wait.
        let timeout = CATALOG_HTTP_TIMEOUT
            .max(Duration::from_secs(config.auth_poll_secs.saturating_add(15)));
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
            poll_wait_secs: config.auth_poll_secs.max(1),
            poll_interval: AUTH_POLL_INTERVAL,
            wait_timeout: (config.auth_timeout_secs > 0)
                .then(|| Duration::from_secs(config.auth_timeout_secs)),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, CatalogError> {
        let response = request.bearer_auth(&self.api_key).send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        let code = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(CatalogError::Status(code, body))
    }

    async fn fetch_toolkit(
        &self,
        toolkit: &str,
        query: &ToolQuery,
    ) -> Result<Vec<ToolDefinition>, CatalogError> {
        let limit = query.limit.to_string();
        let request = self.http.get(self.url("/v1/formatted_tools")).query(&[
            ("format", "openai"),
            ("toolkit", toolkit),
            ("limit", limit.as_str()),
            ("user_id", query.user_id.as_str()),
        ]);
        let page: FormattedToolsPage = self.send(request).await?.json().await?;
        Ok(page.items)
    }

    async fn fetch_tool(
        &self,
        tool: &str,
        user_id: &str,
    ) -> Result<ToolDefinition, CatalogError> {
        let request = self
            .http
            .get(self.url(&format!("/v1/formatted_tools/{tool}")))
            .query(&[("format", "openai"), ("user_id", user_id)]);
        Ok(self.send(request).await?.json().await?)
    }
}

#[async_trait]
impl ToolCatalog for ArcadeClient {
    async fn discover(&self, query: &ToolQuery) -> Result<Vec<CatalogTool>, CatalogError> {
        let mut definitions = Vec::new();
        for toolkit in &query.toolkits {
            definitions.extend(self.fetch_toolkit(toolkit, query).await?);
        }
        for tool in &query.tools {
            definitions.push(self.fetch_tool(tool, &query.user_id).await?);
        }

        let mut tools: Vec<CatalogTool> = Vec::new();
        for definition in definitions {
            if tools.len() >= query.limit {
                break;
            }
            if tools
                .iter()
                .any(|known| known.function_name() == definition.function.name)
            {
                continue;
            }
            tools.push(CatalogTool::from_definition(definition));
        }
        info!(count = tools.len(), "discovered catalog tools");
        Ok(tools)
    }

    async fn authorize(
        &self,
        tool_name: &str,
        user_id: &str,
    ) -> Result<AuthorizationResponse, CatalogError> {
        let request = self
            .http
            .post(self.url("/v1/tools/authorize"))
            .json(&json!({ "tool_name": tool_name, "user_id": user_id }));
        let response: AuthorizationResponse = self.send(request).await?.json().await?;
        debug!(tool_name, status = ?response.status, "authorization checked");
        Ok(response)
    }

    async fn execute(
        &self,
        tool_name: &str,
        input: &serde_json::Value,
        user_id: &str,
    ) -> Result<ToolOutput, CatalogError> {
        let request = self.http.post(self.url("/v1/tools/execute")).json(&json!({
            "tool_name": tool_name,
            "input": input,
            "user_id": user_id,
        }));
        let payload: ExecuteResponse = self.send(request).await?.json().await?;
        let output = payload.output.unwrap_or(ExecuteOutput {
            value: None,
            error: None,
        });
        if let Some(error) = output.error {
            return Ok(ToolOutput::error(error.message));
        }
        if !payload.success {
            return Ok(ToolOutput::error(format!("{tool_name} did not succeed")));
        }
        Ok(ToolOutput {
            value: output.value,
            error: None,
        })
    }
}

#[async_trait]
impl AuthorizationWaiter for ArcadeClient {
    async fn wait_for_completion(&self, handle: &AuthorizationHandle) -> Result<(), CatalogError> {
        let started = Instant::now();
        let wait = self.poll_wait_secs.to_string();

        loop {
            let response = self
                .http
                .get(self.url("/v1/auth/status"))
                .query(&[("id", handle.id.as_str()), ("wait", wait.as_str())])
                .bearer_auth(&self.api_key)
                .send()
                .await?;

            let code = response.status().as_u16();
            if code == 404 || code == 410 {
                return Err(CatalogError::AuthorizationExpired);
            }
            if !response.status().is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(CatalogError::Status(code, body));
            }

            let status: AuthorizationResponse = response.json().await?;
            match status.status {
                AuthorizationStatus::Completed => return Ok(()),
                AuthorizationStatus::Failed => {
                    return Err(CatalogError::AuthorizationFailed(format!(
                        "authorization `{}` was not granted",
                        handle.id
                    )))
                }
                AuthorizationStatus::Pending | AuthorizationStatus::Unknown => {}
            }

            if self
                .wait_timeout
                .is_some_and(|limit| started.elapsed() >= limit)
            {
                return Err(CatalogError::AuthorizationExpired);
            }
            debug!(id = %handle.id, "authorization still pending");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned response per connection, returning each request's
    /// first line.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            for (code, body) in responses {
                let (mut stream, _) = listener.accept().await.expect("accept");
                let mut buf = [0u8; 8192];
                let n = stream.read(&mut buf).await.unwrap_or(0);
                let head = String::from_utf8_lossy(&buf[..n]);
                seen.push(head.lines().next().unwrap_or_default().to_string());
                let response = format!(
                    "HTTP/1.1 {code} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
            }
            seen
        });
        (format!("http://{addr}"), handle)
    }

    fn client_for(base_url: String) -> ArcadeClient {
        let mut client = ArcadeClient::new(&CatalogConfig {
            base_url,
            api_key: "arc-test".to_string(),
            auth_poll_secs: 1,
            ..CatalogConfig::default()
        });
        client.poll_interval = Duration::from_millis(10);
        client
    }

    const POST_TWEET: &str = r#"{"type":"function","function":{"name":"X_PostTweet","description":"Post","parameters":{"type":"object"}}}"#;

    fn handle() -> AuthorizationHandle {
        AuthorizationHandle {
            id: "auth_1".to_string(),
            url: "https://consent.example".to_string(),
        }
    }

    #[tokio::test]
    async fn discover_merges_toolkits_and_named_tools_without_duplicates() {
        let page = r#"{"items":[
            {"type":"function","function":{"name":"X_PostTweet","description":"Post","parameters":{"type":"object"}}},
            {"type":"function","function":{"name":"X_LookupTweetById","description":"Lookup","parameters":{"type":"object"}}}
        ]}"#;
        let (base, server) = serve(vec![(200, page), (200, POST_TWEET)]).await;
        let client = client_for(base);
        let tools = client
            .discover(&ToolQuery {
                toolkits: vec!["X".to_string()],
                tools: vec!["X.PostTweet".to_string()],
                user_id: "me".to_string(),
                limit: 10,
            })
            .await
            .unwrap();

        let names: Vec<&str> = tools.iter().map(CatalogTool::function_name).collect();
        assert_eq!(names, vec!["X_PostTweet", "X_LookupTweetById"]);
        assert_eq!(tools[0].qualified_name, "X.PostTweet");

        let seen = server.await.unwrap();
        assert!(seen[0].starts_with("GET /v1/formatted_tools?"), "{}", seen[0]);
        assert!(seen[0].contains("toolkit=X"), "{}", seen[0]);
        assert!(seen[0].contains("limit=10"), "{}", seen[0]);
        assert!(seen[1].starts_with("GET /v1/formatted_tools/X.PostTweet?"), "{}", seen[1]);
    }

    #[tokio::test]
    async fn discover_caps_results_at_limit() {
        let page = r#"{"items":[
            {"type":"function","function":{"name":"X_A"}},
            {"type":"function","function":{"name":"X_B"}}
        ]}"#;
        let (base, _server) = serve(vec![(200, page)]).await;
        let tools = client_for(base)
            .discover(&ToolQuery {
                toolkits: vec!["X".to_string()],
                tools: Vec::new(),
                user_id: "me".to_string(),
                limit: 1,
            })
            .await
            .unwrap();
        assert_eq!(tools.len(), 1);
    }

    #[tokio::test]
    async fn authorize_parses_pending_flow() {
        let (base, server) = serve(vec![(
            200,
            r#"{"id":"auth_9","url":"https://consent.example/9","status":"pending"}"#,
        )])
        .await;
        let resp = client_for(base).authorize("X.PostTweet", "me").await.unwrap();
        assert_eq!(resp.status, AuthorizationStatus::Pending);
        assert_eq!(resp.handle().unwrap().id, "auth_9");
        assert_eq!(server.await.unwrap()[0], "POST /v1/tools/authorize HTTP/1.1");
    }

    #[tokio::test]
    async fn wait_polls_until_completed() {
        let (base, server) = serve(vec![
            (200, r#"{"id":"auth_1","status":"pending"}"#),
            (200, r#"{"id":"auth_1","status":"completed"}"#),
        ])
        .await;
        client_for(base).wait_for_completion(&handle()).await.unwrap();
        let seen = server.await.unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("id=auth_1"), "{}", seen[0]);
        assert!(seen[0].contains("wait=1"), "{}", seen[0]);
    }

    #[tokio::test]
    async fn pending_polls_are_spaced_out() {
        let (base, server) = serve(vec![
            (200, r#"{"id":"auth_1","status":"pending"}"#),
            (200, r#"{"id":"auth_1","status":"pending"}"#),
            (200, r#"{"id":"auth_1","status":"completed"}"#),
        ])
        .await;
        let mut client = client_for(base);
        client.poll_interval = Duration::from_millis(150);

        let started = std::time::Instant::now();
        client.wait_for_completion(&handle()).await.unwrap();
        assert!(
            started.elapsed() >= Duration::from_millis(300),
            "polled too fast: {:?}",
            started.elapsed()
        );
        assert_eq!(server.await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn wait_gives_up_after_configured_timeout() {
        let (base, _server) = serve(vec![(200, r#"{"id":"auth_1","status":"pending"}"#)]).await;
        let mut client = client_for(base);
        client.wait_timeout = Some(Duration::ZERO);
        let err = client.wait_for_completion(&handle()).await.unwrap_err();
        assert!(matches!(err, CatalogError::AuthorizationExpired), "got: {err}");
    }

    #[test]
    fn zero_timeout_waits_indefinitely() {
        let client = ArcadeClient::new(&CatalogConfig {
            auth_timeout_secs: 0,
            ..CatalogConfig::default()
        });
        assert_eq!(client.wait_timeout, None);
        assert_eq!(client.poll_interval, AUTH_POLL_INTERVAL);
    }

    #[tokio::test]
    async fn wait_reports_denial_as_failed() {
        let (base, _server) = serve(vec![(200, r#"{"id":"auth_1","status":"failed"}"#)]).await;
        let err = client_for(base).wait_for_completion(&handle()).await.unwrap_err();
        assert!(matches!(err, CatalogError::AuthorizationFailed(_)), "got: {err}");
    }

    #[tokio::test]
    async fn wait_reports_unknown_handle_as_expired() {
        let (base, _server) = serve(vec![(404, r#"{"error":"not found"}"#)]).await;
        let err = client_for(base).wait_for_completion(&handle()).await.unwrap_err();
        assert!(matches!(err, CatalogError::AuthorizationExpired), "got: {err}");
    }

    #[tokio::test]
    async fn execute_maps_value_and_error_payloads() {
        let (base, _server) = serve(vec![
            (200, r#"{"output":{"value":{"tweet_id":"42"}},"success":true}"#),
            (200, r#"{"output":{"error":{"message":"duplicate tweet"}},"success":false}"#),
        ])
        .await;
        let client = client_for(base);
        let ok = client
            .execute("X.PostTweet", &json!({"tweet_text": "hi"}), "me")
            .await
            .unwrap();
        assert_eq!(ok.value, Some(json!({"tweet_id": "42"})));

        let failed = client
            .execute("X.PostTweet", &json!({"tweet_text": "hi"}), "me")
            .await
            .unwrap();
        assert_eq!(failed.error.as_deref(), Some("duplicate tweet"));
    }

    #[tokio::test]
    async fn non_success_status_is_surfaced() {
        let (base, _server) = serve(vec![(401, r#"{"error":"bad key"}"#)]).await;
        let err = client_for(base).authorize("X.PostTweet", "me").await.unwrap_err();
        assert!(matches!(err, CatalogError::Status(401, _)), "got: {err}");
    }
}

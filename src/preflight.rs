//! Startup configuration validation.
//!
//! Runs once before any session begins so that missing identifiers and
//! malformed endpoints surface as actionable errors instead of failures on
//! the first request.

use crate::config::Config;
use crate::error::ConfigError;
use std::net::IpAddr;

/// Check that the resolved config has everything a session needs.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.catalog.user_id.trim().is_empty() {
        return Err(ConfigError::Missing(
            "catalog.user_id (set TOLLGATE_USER_ID or ARCADE_USER_ID)",
        ));
    }
    if config.model.model.trim().is_empty() {
        return Err(ConfigError::Missing(
            "model.model (set TOLLGATE_MODEL or OPENAI_MODEL)",
        ));
    }

    validate_base_url("model.base_url", &config.model.base_url)?;
    validate_base_url("catalog.base_url", &config.catalog.base_url)?;

    if config.catalog.api_key.trim().is_empty() {
        return Err(ConfigError::Missing("catalog.api_key (set ARCADE_API_KEY)"));
    }
    // Local OpenAI-compatible servers usually run without auth.
    if config.model.api_key.trim().is_empty() && !is_localhost_endpoint(&config.model.base_url) {
        return Err(ConfigError::Missing(
            "model.api_key (set TOLLGATE_API_KEY or OPENAI_API_KEY)",
        ));
    }

    if config.catalog.toolkits.is_empty() && config.catalog.tools.is_empty() {
        return Err(ConfigError::Invalid(
            "no toolkits or tools configured under [catalog]".to_string(),
        ));
    }
    if config.catalog.limit == 0 {
        return Err(ConfigError::Invalid(
            "catalog.limit must be at least 1".to_string(),
        ));
    }
    if config.agent.max_iterations == 0 {
        return Err(ConfigError::Invalid(
            "agent.max_iterations must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_base_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} is empty")));
    }

    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|err| ConfigError::Invalid(format!("invalid {field} `{trimmed}`: {err}")))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigError::Invalid(format!(
                "invalid {field} `{trimmed}`: unsupported scheme `{other}` (expected http or https)"
            )));
        }
    }
    if parsed.host_str().is_none() {
        return Err(ConfigError::Invalid(format!(
            "invalid {field} `{trimmed}`: missing host"
        )));
    }
    Ok(())
}

fn is_localhost_endpoint(base_url: &str) -> bool {
    let Ok(parsed) = reqwest::Url::parse(base_url.trim()) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .ok()
        .is_some_and(|ip| ip.is_loopback())
}

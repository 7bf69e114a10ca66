//! Config-file to runtime-config resolution.

use crate::error::ConfigError;

use super::defaults::DEFAULT_CATALOG_KEY_ENV;
use super::types::{CatalogSection, FileConfig, ModelSection};
use super::{CatalogConfig, Config, ModelConfig};

pub(super) fn resolve_file_config<FEnv>(
    parsed: FileConfig,
    env_lookup: &FEnv,
) -> Result<Config, ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    Ok(Config {
        model: resolve_model(parsed.model, env_lookup)?,
        catalog: resolve_catalog(parsed.catalog, env_lookup)?,
        agent: parsed.agent,
        session: parsed.session,
        display: parsed.display,
    })
}

fn resolve_model<FEnv>(section: ModelSection, env_lookup: &FEnv) -> Result<ModelConfig, ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    let api_key = resolve_key(&section.api_key, &section.api_key_env, None, env_lookup, "model")?;
    Ok(ModelConfig {
        base_url: section.base_url.trim().to_string(),
        api_key,
        model: section.model.trim().to_string(),
        timeout_secs: section.timeout_secs.max(1),
        temperature: section.temperature,
    })
}

fn resolve_catalog<FEnv>(
    section: CatalogSection,
    env_lookup: &FEnv,
) -> Result<CatalogConfig, ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    let api_key = resolve_key(
        &section.api_key,
        &section.api_key_env,
        Some(DEFAULT_CATALOG_KEY_ENV),
        env_lookup,
        "catalog",
    )?;
    Ok(CatalogConfig {
        base_url: section.base_url.trim().to_string(),
        api_key,
        user_id: section.user_id.trim().to_string(),
        toolkits: normalized_list(section.toolkits),
        tools: normalized_list(section.tools),
        limit: section.limit,
        approval_tools: normalized_list(section.approval_tools),
        auth_poll_secs: section.auth_poll_secs.max(1),
        auth_timeout_secs: section.auth_timeout_secs,
    })
}

/// Pick the key from exactly one configured source.
///
/// `fallback_env` is consulted only when neither `api_key` nor
/// `api_key_env` is set.
fn resolve_key<FEnv>(
    inline: &str,
    key_env: &Option<String>,
    fallback_env: Option<&str>,
    env_lookup: &FEnv,
    section: &str,
) -> Result<String, ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    let inline = normalized_string(inline);
    let key_env = normalized_option(key_env);
    match (inline, key_env) {
        (Some(_), Some(_)) => Err(ConfigError::Invalid(format!(
            "only one of {section}.api_key and {section}.api_key_env may be set"
        ))),
        (Some(key), None) => Ok(key),
        (None, Some(name)) => Ok(env_lookup(&name).unwrap_or_default().trim().to_string()),
        (None, None) => Ok(fallback_env
            .and_then(|name| env_lookup(name))
            .unwrap_or_default()
            .trim()
            .to_string()),
    }
}

fn normalized_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values.iter().filter_map(|v| normalized_string(v)) {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

pub(super) fn normalized_option(value: &Option<String>) -> Option<String> {
    value.as_deref().and_then(normalized_string)
}

pub(super) fn normalized_string(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

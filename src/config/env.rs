//! Environment overrides.
//!
//! Canonical `TOLLGATE_*` variables take precedence. The `ARCADE_*` and
//! `OPENAI_*` names used by the surrounding tool ecosystem are accepted as
//! aliases and recorded in diagnostics when they are the ones in effect.

use crate::error::ConfigError;

use super::{Config, ConfigDiagnostics};

/// Canonical variable and its accepted alias, in lookup order.
const ALIASED_VARS: &[(&str, &str)] = &[
    ("TOLLGATE_USER_ID", "ARCADE_USER_ID"),
    ("TOLLGATE_MODEL", "OPENAI_MODEL"),
    ("TOLLGATE_BASE_URL", "OPENAI_BASE_URL"),
    ("TOLLGATE_API_KEY", "OPENAI_API_KEY"),
];

pub(super) fn apply_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
    diagnostics: &mut ConfigDiagnostics,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(user_id) = aliased(env_lookup, "TOLLGATE_USER_ID", diagnostics) {
        config.catalog.user_id = user_id;
    }
    if let Some(model) = aliased(env_lookup, "TOLLGATE_MODEL", diagnostics) {
        config.model.model = model;
    }
    if let Some(url) = aliased(env_lookup, "TOLLGATE_BASE_URL", diagnostics) {
        config.model.base_url = url;
    }
    if let Some(key) = aliased(env_lookup, "TOLLGATE_API_KEY", diagnostics) {
        config.model.api_key = key;
    }
    if let Some(key) = non_empty(env_lookup, "ARCADE_API_KEY") {
        config.catalog.api_key = key;
    }
    if let Some(url) = non_empty(env_lookup, "ARCADE_BASE_URL") {
        config.catalog.base_url = url;
    }
    if let Some(id) = non_empty(env_lookup, "TOLLGATE_SESSION_ID") {
        config.session.id = id;
    }
    if let Some(timeout) = non_empty(env_lookup, "TOLLGATE_API_TIMEOUT_SECS") {
        let parsed = timeout.parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid TOLLGATE_API_TIMEOUT_SECS value `{timeout}`: expected positive integer seconds"
            ))
        })?;
        // Zero would mean "no timeout" to reqwest.
        config.model.timeout_secs = parsed.max(1);
    }
    Ok(())
}

/// Resolve a canonical variable, falling back to its alias.
fn aliased<FEnv>(
    env_lookup: &FEnv,
    canonical: &str,
    diagnostics: &mut ConfigDiagnostics,
) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(value) = non_empty(env_lookup, canonical) {
        return Some(value);
    }
    let (_, alias) = ALIASED_VARS.iter().find(|(name, _)| *name == canonical)?;
    let value = non_empty(env_lookup, alias)?;
    diagnostics.aliases_used.push((*alias).to_string());
    Some(value)
}

/// Env values are trimmed; blank counts as unset.
pub(super) fn non_empty<FEnv>(env_lookup: &FEnv, name: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`TOLLGATE_USER_ID`, `TOLLGATE_MODEL`,
//!    `TOLLGATE_BASE_URL`, `TOLLGATE_API_KEY`, `ARCADE_API_KEY`,
//!    `ARCADE_BASE_URL`, `TOLLGATE_SESSION_ID`), with `ARCADE_USER_ID`,
//!    `OPENAI_MODEL`, `OPENAI_BASE_URL` and `OPENAI_API_KEY` as aliases.
//! 2. TOML file specified via --config CLI flag
//! 3. ./tollgate.toml in the current directory
//! 4. $XDG_CONFIG_HOME/tollgate/tollgate.toml (or the platform config dir)
//! 5. Built-in defaults
//!
//! CLI flags are applied on top of the result by the binary.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

mod defaults;
mod env;
mod resolve;
mod sources;
mod types;

pub use types::{
    AgentConfig, CatalogConfig, Config, ConfigDiagnostics, DisplayConfig, LoadedConfig,
    ModelConfig, SessionConfig,
};
use types::FileConfig;

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config(path_override: Option<&str>) -> Result<Config, ConfigError> {
    Ok(load_config_with_diagnostics(path_override)?.config)
}

/// Load configuration and report where it came from.
pub fn load_config_with_diagnostics(
    path_override: Option<&str>,
) -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (config_text, source) = sources::read_config_text(path_override, &read_file, &config_root)?;
    let mut diagnostics = ConfigDiagnostics {
        source: source.to_string(),
        ..ConfigDiagnostics::default()
    };
    let parsed: FileConfig = toml::from_str(&config_text)?;
    let mut config = resolve::resolve_file_config(parsed, &env_lookup)?;
    env::apply_env_overrides(&mut config, &env_lookup, &mut diagnostics)?;
    diagnostics.aliases_used.sort();
    diagnostics.aliases_used.dedup();

    Ok(LoadedConfig {
        config,
        diagnostics,
    })
}

/// Root directory holding the global `tollgate/` config folder.
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::config_dir()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! CLI entry point for tollgate.

mod cli;

use clap::Parser;
use std::sync::Arc;
use tollgate::api::ApiClient;
use tollgate::build_info;
use tollgate::catalog::{ArcadeClient, ToolCatalog, ToolQuery};
use tollgate::config::load_config_with_diagnostics;
use tollgate::control::{ResumeLoop, SessionLoop};
use tollgate::engine::{AgentEngine, AgentSettings, SessionContext};
use tollgate::logging::init_tracing;
use tollgate::preflight::validate_config;
use tollgate::prompt::{render_system_prompt, SystemPromptParams};
use tollgate::ui::input::ConsoleInput;
use tollgate::ui::render::{RenderSink, Renderer};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();

    // Load config.
    let loaded = match load_config_with_diagnostics(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => fail(e),
    };
    let mut config = loaded.config;

    // Apply CLI overrides.
    args.apply_to(&mut config);

    init_tracing(args.log_level.as_deref(), config.display.color);
    info!(
        version = %build_info::startup_metadata_line(),
        source = %loaded.diagnostics.source,
        "starting tollgate"
    );
    for alias in &loaded.diagnostics.aliases_used {
        debug!(variable = %alias, "configuration read from alias variable");
    }

    if let Err(e) = validate_config(&config) {
        fail(e);
    }

    let renderer = Renderer::new(config.display.color, config.display.show_tool_calls);
    let model = Arc::new(ApiClient::new(&config.model));
    let catalog = Arc::new(ArcadeClient::new(&config.catalog));

    let query = ToolQuery {
        toolkits: config.catalog.toolkits.clone(),
        tools: config.catalog.tools.clone(),
        user_id: config.catalog.user_id.clone(),
        limit: config.catalog.limit,
    };
    let tools = match catalog.discover(&query).await {
        Ok(tools) => tools,
        Err(e) => fail(format!("failed to load tools: {e}")),
    };
    if tools.is_empty() {
        warn!("tool catalog returned no tools");
        renderer.warn("no tools were found for the configured toolkits; the agent can only chat");
    }
    info!(count = tools.len(), "tools loaded");

    let system_prompt = render_system_prompt(SystemPromptParams {
        toolkits: config.catalog.toolkits.iter().map(String::as_str).collect(),
        available_tools: tools.iter().map(|t| t.function_name()).collect(),
        custom_instructions: Some(config.agent.system_prompt.as_str()),
    });

    let engine = AgentEngine::new(
        AgentSettings::from_config(&config, system_prompt),
        model,
        catalog.clone(),
        tools,
    );
    let session = SessionContext::from_configured(&config.session.id);
    info!(session = %session, "session ready");

    let mut input = ConsoleInput::new();
    let turns = ResumeLoop::new(&engine, catalog.as_ref(), &renderer, &session);
    let outcome = SessionLoop::new(turns, &renderer, &mut input).run().await;

    info!(
        completed = outcome.turns_completed,
        failed = outcome.turns_failed,
        "session ended"
    );
}

/// Print a startup error and exit with status 1.
fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("error: {err}");
    std::process::exit(1);
}

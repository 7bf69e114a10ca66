//! CLI argument parsing via clap.

use clap::Parser;
use tollgate::build_info;
use tollgate::config::Config;

/// A terminal chat agent for X whose tool calls pause for authorization
/// and approval.
#[derive(Debug, Parser)]
#[command(
    name = "tollgate",
    version = build_info::VERSION,
    after_help = build_info::HELP_BUILD_METADATA
)]
pub struct Args {
    /// Path to config file (default: ./tollgate.toml or ~/.config/tollgate/tollgate.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Override model name.
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Identity used to authorize and run catalog tools.
    #[arg(short = 'u', long = "user-id")]
    pub user_id: Option<String>,

    /// Toolkit to load; repeat for several. Replaces the configured list.
    #[arg(long = "toolkit", value_name = "NAME")]
    pub toolkits: Vec<String>,

    /// Individual tool to load; repeat for several. Replaces the configured list.
    #[arg(long = "tool", value_name = "NAME")]
    pub tools: Vec<String>,

    /// Maximum number of tool definitions to fetch.
    #[arg(long = "limit")]
    pub limit: Option<usize>,

    /// Conversation id; a random one is generated when omitted.
    #[arg(short = 's', long = "session")]
    pub session: Option<String>,

    /// Log filter directive, e.g. `debug` or `tollgate=trace` (default: $TOLLGATE_LOG or warn).
    #[arg(long = "log-level", value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Args {
    /// Layer flag values over the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.model.model = model.clone();
        }
        if let Some(user_id) = &self.user_id {
            config.catalog.user_id = user_id.clone();
        }
        if !self.toolkits.is_empty() {
            config.catalog.toolkits = self.toolkits.clone();
        }
        if !self.tools.is_empty() {
            config.catalog.tools = self.tools.clone();
        }
        if let Some(limit) = self.limit {
            config.catalog.limit = limit;
        }
        if let Some(session) = &self.session {
            config.session.id = session.clone();
        }
        if self.no_color {
            config.display.color = false;
        }
    }
}

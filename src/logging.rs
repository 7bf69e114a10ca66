//! Diagnostic log setup.
//!
//! Logs go to stderr so they never mix with assistant output on stdout.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive, e.g. `tollgate=debug`.
pub const LOG_ENV: &str = "TOLLGATE_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Pick the filter directive: CLI flag, then `TOLLGATE_LOG`, then `warn`.
pub fn filter_directive(
    level_override: Option<&str>,
    env_lookup: impl Fn(&str) -> Option<String>,
) -> String {
    level_override
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| env_lookup(LOG_ENV).filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global fmt subscriber. Call once, before the session starts.
///
/// An unparseable directive falls back to `warn` with a notice on stderr.
pub fn init_tracing(level_override: Option<&str>, ansi: bool) {
    let directive = filter_directive(level_override, |name| std::env::var(name).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("warning: ignoring invalid log filter `{directive}`: {e}");
        EnvFilter::new(DEFAULT_FILTER)
    });

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .try_init();
    if let Err(e) = installed {
        eprintln!("warning: logging already initialized: {e}");
    }
}

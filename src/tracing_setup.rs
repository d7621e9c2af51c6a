//! Tracing subscriber initialization for the RPC binary.
//!
//! Logs go to stderr; stdout carries the protocol.
//!
//! Filter priority:
//! 1. `SMART_BOOKMARKS_LOG` (directives, e.g. `smart_bookmarks=debug,warn`)
//! 2. `RUST_LOG`
//! 3. `warn`

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Project-specific filter variable.
pub const LOG_ENV_VAR: &str = "SMART_BOOKMARKS_LOG";

/// Installs the global subscriber. Returns `false` if one was already set.
pub fn init_subscriber() -> bool {
    let use_ansi = std::io::IsTerminal::is_terminal(&std::io::stderr());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(use_ansi)
        .with_target(true)
        .compact();

    tracing_subscriber::registry()
        .with(build_env_filter())
        .with(fmt_layer)
        .try_init()
        .is_ok()
}

fn build_env_filter() -> EnvFilter {
    // An unparseable project variable falls through rather than failing startup.
    if let Ok(directives) = std::env::var(LOG_ENV_VAR) {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

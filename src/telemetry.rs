//! Tracing setup.
//!
//! - LOG_LEVEL holds the filter directives, e.g. "debug" or
//!   "info,progress=debug,content=debug,deyim_backend=debug".
//! - LOG_FORMAT=json switches to structured JSON lines; anything else is the
//!   human-readable format.
//!
//! Targets used across the crate: `deyim_backend` (service lifecycle),
//! `content` (catalog and search), `progress` (progression, points,
//! achievements, daily queue). TraceLayer adds per-request spans on top.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,progress=debug,content=debug,deyim_backend=debug,tower_http=info,axum=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true);

    if matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

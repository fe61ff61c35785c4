//! Deyim · progression and content-selection backend
//!
//! - Axum HTTP + WebSocket API for the learning app
//! - Catalog from Supabase when configured, bundled samples otherwise
//! - Progress, points, streaks, achievements and the daily queue persisted as
//!   JSON documents under DATA_DIR
//!
//! Important env variables:
//!   PORT               : u16 (default 3000)
//!   DATA_DIR           : directory for persisted documents (default ./data)
//!   SUPABASE_URL       : enables the remote catalog if present
//!   SUPABASE_ANON_KEY  : API key sent with catalog requests
//!   DEYIM_CONFIG_PATH  : path to TOML config (data dir, point amounts, content source)
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

mod achievements;
mod catalog;
mod clock;
mod config;
mod daily;
mod device;
mod domain;
mod gamification;
mod pinyin;
mod progress;
mod protocol;
mod quiz;
mod routes;
mod search;
mod seeds;
mod state;
mod storage;
mod supabase;
mod telemetry;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use crate::catalog::ContentSource;
use crate::clock::SystemClock;
use crate::config::load_engine_config_from_env;
use crate::device::LoggingDevice;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::FileStore;
use crate::supabase::SupabaseSource;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = load_engine_config_from_env();

  let source: Option<Arc<dyn ContentSource>> = match SupabaseSource::from_config(&cfg.content_source) {
    Some(s) => {
      info!(target: "deyim_backend", base_url = %s.base_url, "Remote content source enabled.");
      Some(Arc::new(s))
    }
    None => {
      info!(target: "deyim_backend", "No SUPABASE_URL; serving bundled content.");
      None
    }
  };

  info!(target: "deyim_backend", data_dir = %cfg.data_dir.display(), "Using file store");
  let state = Arc::new(AppState::new(
    Arc::new(FileStore::new(cfg.data_dir.clone())),
    source,
    Arc::new(SystemClock),
    Arc::new(LoggingDevice),
    cfg.points.clone(),
  ));

  // Profile, catalog, then the daily login; each awaited before the next.
  let load = state.start().await;
  if let Some(err) = &load.error {
    warn!(target: "deyim_backend", error = %err, "Started with bundled content");
  }

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "deyim_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "deyim_backend", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "deyim_backend", error = %e, "Failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
}

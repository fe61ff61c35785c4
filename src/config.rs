//! Engine configuration from an optional TOML file plus environment overrides.
//!
//! Schema (all keys optional):
//!   data_dir = "./data"
//!   [points]          award amounts, see `PointsTable`
//!   [content_source]  url, anon_key, timeout_secs
//!
//! Environment wins over the file: DATA_DIR, SUPABASE_URL, SUPABASE_ANON_KEY.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

use crate::gamification::PointsTable;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  pub data_dir: PathBuf,
  pub points: PointsTable,
  pub content_source: ContentSourceCfg,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      data_dir: PathBuf::from("./data"),
      points: PointsTable::default(),
      content_source: ContentSourceCfg::default(),
    }
  }
}

/// Remote catalog endpoint. No URL means the bundled samples are served.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ContentSourceCfg {
  pub url: Option<String>,
  pub anon_key: Option<String>,
  pub timeout_secs: u64,
}

impl Default for ContentSourceCfg {
  fn default() -> Self {
    Self { url: None, anon_key: None, timeout_secs: 20 }
  }
}

impl EngineConfig {
  /// Apply environment overrides; `lookup` is `std::env::var` outside tests.
  pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
    if let Some(dir) = lookup("DATA_DIR").filter(|s| !s.is_empty()) {
      self.data_dir = PathBuf::from(dir);
    }
    if let Some(url) = lookup("SUPABASE_URL").filter(|s| !s.is_empty()) {
      self.content_source.url = Some(url);
    }
    if let Some(key) = lookup("SUPABASE_ANON_KEY").filter(|s| !s.is_empty()) {
      self.content_source.anon_key = Some(key);
    }
    self
  }
}

/// Load from DEYIM_CONFIG_PATH if set, then apply env overrides.
/// Any IO or parse error is logged and defaults are used.
pub fn load_engine_config_from_env() -> EngineConfig {
  let from_file = std::env::var("DEYIM_CONFIG_PATH").ok().and_then(|path| {
    match std::fs::read_to_string(&path) {
      Ok(s) => match toml::from_str::<EngineConfig>(&s) {
        Ok(cfg) => {
          info!(target: "deyim_backend", %path, "Loaded engine config (TOML)");
          Some(cfg)
        }
        Err(e) => {
          error!(target: "deyim_backend", %path, error = %e, "Failed to parse TOML config");
          None
        }
      },
      Err(e) => {
        error!(target: "deyim_backend", %path, error = %e, "Failed to read TOML config file");
        None
      }
    }
  });

  from_file.unwrap_or_default().with_overrides(|k| std::env::var(k).ok())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  #[test]
  fn partial_toml_keeps_defaults() {
    let cfg: EngineConfig = toml::from_str(
      r#"
        data_dir = "/var/lib/deyim"
        [points]
        daily_login = 15
        [content_source]
        url = "https://example.supabase.co"
      "#,
    )
    .unwrap();

    assert_eq!(cfg.data_dir, PathBuf::from("/var/lib/deyim"));
    assert_eq!(cfg.points.daily_login, 15);
    assert_eq!(cfg.points.share, 3);
    assert_eq!(cfg.content_source.url.as_deref(), Some("https://example.supabase.co"));
    assert_eq!(cfg.content_source.timeout_secs, 20);
  }

  #[test]
  fn env_overrides_file_values() {
    let env: HashMap<&str, &str> = [("DATA_DIR", "/tmp/d"), ("SUPABASE_ANON_KEY", "k"), ("SUPABASE_URL", "")]
      .into_iter()
      .collect();
    let mut base = EngineConfig::default();
    base.content_source.url = Some("https://file".into());

    let cfg = base.with_overrides(|k| env.get(k).map(|v| v.to_string()));
    assert_eq!(cfg.data_dir, PathBuf::from("/tmp/d"));
    assert_eq!(cfg.content_source.anon_key.as_deref(), Some("k"));
    assert_eq!(cfg.content_source.url.as_deref(), Some("https://file"));
  }
}

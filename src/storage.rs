//! Durable key-value storage for the persisted entities.
//!
//! Each entity lives under its own key as a JSON document. There is no multi-key
//! transaction: every write stands alone and the last write per key wins.

use std::{collections::HashMap, path::PathBuf, sync::Mutex};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKey {
  UserProgress,
  GamificationStats,
  Achievements,
  DailyQueue,
  UserSettings,
}

impl StorageKey {
  pub fn as_str(self) -> &'static str {
    match self {
      StorageKey::UserProgress => "user_progress",
      StorageKey::GamificationStats => "gamification_stats",
      StorageKey::Achievements => "achievements",
      StorageKey::DailyQueue => "daily_queue",
      StorageKey::UserSettings => "user_settings",
    }
  }
}

#[derive(Debug, Error)]
pub enum StorageError {
  #[error("storage io error on '{key}': {source}")]
  Io { key: String, #[source] source: std::io::Error },
  #[error("invalid JSON under '{key}': {source}")]
  Json { key: String, #[source] source: serde_json::Error },
  #[error("storage unavailable: {0}")]
  Unavailable(String),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
  async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
  async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}

/// One `<key>.json` file per key inside a data directory.
pub struct FileStore {
  dir: PathBuf,
}

impl FileStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  fn path_for(&self, key: &str) -> PathBuf {
    self.dir.join(format!("{key}.json"))
  }
}

#[async_trait]
impl KeyValueStore for FileStore {
  async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    match tokio::fs::read_to_string(self.path_for(key)).await {
      Ok(s) => Ok(Some(s)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
    }
  }

  async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
    let io = |source| StorageError::Io { key: key.to_string(), source };
    tokio::fs::create_dir_all(&self.dir).await.map_err(io)?;
    // Write beside the target then rename so a crash never leaves half a document.
    let tmp = self.dir.join(format!("{key}.json.tmp"));
    tokio::fs::write(&tmp, value).await.map_err(io)?;
    tokio::fs::rename(&tmp, self.path_for(key)).await.map_err(io)?;
    Ok(())
  }
}

/// Process-local store; nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
  async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    let entries = self.entries.lock().map_err(|e| StorageError::Unavailable(e.to_string()))?;
    Ok(entries.get(key).cloned())
  }

  async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
    let mut entries = self.entries.lock().map_err(|e| StorageError::Unavailable(e.to_string()))?;
    entries.insert(key.to_string(), value);
    Ok(())
  }
}

/// Read and decode one entity. Absence is not an error.
pub async fn read_json<T: DeserializeOwned>(
  store: &dyn KeyValueStore,
  key: StorageKey,
) -> Result<Option<T>, StorageError> {
  let Some(raw) = store.get(key.as_str()).await? else {
    return Ok(None);
  };
  serde_json::from_str(&raw)
    .map(Some)
    .map_err(|source| StorageError::Json { key: key.as_str().to_string(), source })
}

/// Best-effort load used at startup: any failure is logged and the default is used.
pub async fn load_or_default<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: StorageKey) -> T {
  match read_json::<T>(store, key).await {
    Ok(Some(v)) => {
      debug!(target: "deyim_backend", key = key.as_str(), "Loaded persisted entity");
      v
    }
    Ok(None) => {
      debug!(target: "deyim_backend", key = key.as_str(), "Nothing persisted; using defaults");
      T::default()
    }
    Err(e) => {
      warn!(target: "deyim_backend", key = key.as_str(), error = %e, "Failed to load entity; using defaults");
      T::default()
    }
  }
}

/// Encode and write one entity. Failures are logged, never propagated: the
/// in-memory copy stays authoritative until a later write succeeds.
pub async fn persist<T: Serialize>(store: &dyn KeyValueStore, key: StorageKey, value: &T) -> bool {
  let raw = match serde_json::to_string(value) {
    Ok(s) => s,
    Err(e) => {
      error!(target: "deyim_backend", key = key.as_str(), error = %e, "Failed to serialize entity");
      return false;
    }
  };
  match store.set(key.as_str(), raw).await {
    Ok(()) => true,
    Err(e) => {
      error!(target: "deyim_backend", key = key.as_str(), error = %e, "Failed to persist entity");
      false
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{GamificationStats, UserProgress};

  #[tokio::test]
  async fn file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("data"));
    assert_eq!(store.get("user_progress").await.unwrap(), None);

    let mut stats = GamificationStats::default();
    stats.total_points = 42;
    assert!(persist(&store, StorageKey::GamificationStats, &stats).await);

    let loaded: GamificationStats = load_or_default(&store, StorageKey::GamificationStats).await;
    assert_eq!(loaded.total_points, 42);
    assert!(dir.path().join("data/gamification_stats.json").exists());
  }

  #[tokio::test]
  async fn corrupt_document_falls_back_to_default() {
    let store = MemoryStore::default();
    store.set("user_progress", "{not json".into()).await.unwrap();

    assert!(read_json::<UserProgress>(&store, StorageKey::UserProgress).await.is_err());
    let p: UserProgress = load_or_default(&store, StorageKey::UserProgress).await;
    assert_eq!(p, UserProgress::default());
  }
}

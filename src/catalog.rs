//! Content repository: the in-memory catalog plus the current search session.
//!
//! The catalog is read-only from the engine's point of view. It is replaced
//! wholesale on load or refresh and never mutated item by item.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::domain::{Content, ContentType, FilterOptions, FilterPatch, LanguageCode, TravelCategory};
use crate::search::{self, by_popularity_desc};
use crate::seeds::sample_content;

const RELATED_LIMIT: usize = 5;
const TRENDING_LIMIT: usize = 10;
const FEATURED_LIMIT: usize = 5;
const FEATURED_MIN_POPULARITY: f64 = 80.0;

pub const LOAD_FAILED_MESSAGE: &str = "Content service unreachable, using bundled content";
pub const REFRESH_FAILED_MESSAGE: &str = "Content could not be refreshed";

#[derive(Debug, Error)]
pub enum ContentSourceError {
  #[error("content request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("content service returned {status}: {body}")]
  Status { status: u16, body: String },
  #[error("content source misconfigured: {0}")]
  Config(String),
}

/// Where content records come from.
#[async_trait]
pub trait ContentSource: Send + Sync {
  async fn fetch_all(&self) -> Result<Vec<Content>, ContentSourceError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CatalogOrigin {
  Remote,
  #[default]
  Bundled,
}

/// Result of a load: which catalog is live and an optional user-facing warning.
#[derive(Clone, Debug)]
pub struct CatalogLoad {
  pub origin: CatalogOrigin,
  pub count: usize,
  pub error: Option<String>,
}

#[derive(Default)]
struct CatalogState {
  all: Vec<Content>,
  by_id: HashMap<String, usize>,
  origin: CatalogOrigin,
  query: String,
  filters: FilterOptions,
  filtered: Vec<Content>,
  error: Option<String>,
}

impl CatalogState {
  fn replace(&mut self, items: Vec<Content>) {
    self.by_id = items.iter().enumerate().map(|(i, c)| (c.id.clone(), i)).collect();
    self.all = items;
    self.reapply();
  }

  fn reapply(&mut self) {
    self.filtered = search::apply(&self.all, &self.query, &self.filters);
  }
}

pub struct ContentRepository {
  source: Option<Arc<dyn ContentSource>>,
  inner: RwLock<CatalogState>,
}

impl ContentRepository {
  pub fn new(source: Option<Arc<dyn ContentSource>>) -> Self {
    Self { source, inner: RwLock::new(CatalogState::default()) }
  }

  /// Fetch the catalog, falling back to bundled samples on an empty result or failure.
  #[instrument(level = "info", skip(self))]
  pub async fn load_all(&self) -> CatalogLoad {
    let (items, origin, error) = match self.fetch().await {
      Some(Ok(items)) if !items.is_empty() => (items, CatalogOrigin::Remote, None),
      Some(Ok(_)) => {
        info!(target: "content", "Content source returned nothing; using bundled content");
        (sample_content(), CatalogOrigin::Bundled, None)
      }
      Some(Err(e)) => {
        error!(target: "content", error = %e, "Content fetch failed; using bundled content");
        (sample_content(), CatalogOrigin::Bundled, Some(LOAD_FAILED_MESSAGE.to_string()))
      }
      None => (sample_content(), CatalogOrigin::Bundled, None),
    };

    let count = items.len();
    let mut st = self.inner.write().await;
    st.replace(items);
    st.origin = origin;
    st.error = error.clone();
    info!(target: "content", ?origin, count, "Catalog loaded");
    CatalogLoad { origin, count, error }
  }

  /// Refetch. A non-empty result replaces the catalog; otherwise the current one stays.
  #[instrument(level = "info", skip(self))]
  pub async fn refresh(&self) -> CatalogLoad {
    match self.fetch().await {
      Some(Ok(items)) if !items.is_empty() => {
        let count = items.len();
        let mut st = self.inner.write().await;
        st.replace(items);
        st.origin = CatalogOrigin::Remote;
        st.error = None;
        info!(target: "content", count, "Catalog refreshed");
        CatalogLoad { origin: CatalogOrigin::Remote, count, error: None }
      }
      Some(Err(e)) => {
        warn!(target: "content", error = %e, "Content refresh failed; keeping current catalog");
        let mut st = self.inner.write().await;
        st.error = Some(REFRESH_FAILED_MESSAGE.to_string());
        CatalogLoad { origin: st.origin, count: st.all.len(), error: st.error.clone() }
      }
      _ => {
        let mut st = self.inner.write().await;
        st.error = None;
        CatalogLoad { origin: st.origin, count: st.all.len(), error: None }
      }
    }
  }

  async fn fetch(&self) -> Option<Result<Vec<Content>, ContentSourceError>> {
    match &self.source {
      Some(src) => Some(src.fetch_all().await),
      None => None,
    }
  }

  pub async fn all(&self) -> Vec<Content> {
    self.inner.read().await.all.clone()
  }

  pub async fn last_error(&self) -> Option<String> {
    self.inner.read().await.error.clone()
  }

  pub async fn get_by_id(&self, id: &str) -> Option<Content> {
    let st = self.inner.read().await;
    st.by_id.get(id).map(|&i| st.all[i].clone())
  }

  /// Catalog order; unknown ids are skipped.
  pub async fn get_by_ids(&self, ids: &[String]) -> Vec<Content> {
    let st = self.inner.read().await;
    let wanted: std::collections::HashSet<&str> = ids.iter().map(String::as_str).collect();
    st.all.iter().filter(|c| wanted.contains(c.id.as_str())).cloned().collect()
  }

  pub async fn related(&self, id: &str) -> Vec<Content> {
    related(&self.inner.read().await.all, id)
  }

  pub async fn trending(&self) -> Vec<Content> {
    trending(&self.inner.read().await.all)
  }

  pub async fn featured(&self) -> Vec<Content> {
    featured(&self.inner.read().await.all)
  }

  pub async fn by_type(&self, kind: ContentType) -> Vec<Content> {
    self.inner.read().await.all.iter().filter(|c| c.kind == kind).cloned().collect()
  }

  pub async fn by_language(&self, lang: LanguageCode) -> Vec<Content> {
    self.inner.read().await.all.iter().filter(|c| c.language == lang).cloned().collect()
  }

  pub async fn travel_phrases(&self, lang: LanguageCode, category: Option<TravelCategory>) -> Vec<Content> {
    self.inner.read().await.all.iter()
      .filter(|c| c.kind == ContentType::TravelPhrase && c.language == lang)
      .filter(|c| category.map_or(true, |cat| c.travel_category == Some(cat)))
      .cloned()
      .collect()
  }

  pub async fn daily_expressions(&self) -> Vec<Content> {
    self.inner.read().await.all.iter()
      .filter(|c| matches!(c.kind, ContentType::DailyExpression | ContentType::Proverb | ContentType::Idiom))
      .cloned()
      .collect()
  }

  // ---- search session ----

  pub async fn filtered(&self) -> (String, FilterOptions, Vec<Content>) {
    let st = self.inner.read().await;
    (st.query.clone(), st.filters.clone(), st.filtered.clone())
  }

  pub async fn set_query(&self, query: String) -> Vec<Content> {
    let mut st = self.inner.write().await;
    st.query = query;
    st.reapply();
    st.filtered.clone()
  }

  pub async fn set_filters(&self, patch: FilterPatch) -> Vec<Content> {
    let mut st = self.inner.write().await;
    st.filters.merge(patch);
    st.reapply();
    st.filtered.clone()
  }

  pub async fn reset_filters(&self) -> Vec<Content> {
    let mut st = self.inner.write().await;
    st.filters = FilterOptions::default();
    st.query.clear();
    st.reapply();
    st.filtered.clone()
  }
}

/// Explicit links first, then items sharing a tag, then same-language items, up to 5.
pub fn related(all: &[Content], id: &str) -> Vec<Content> {
  let Some(base) = all.iter().find(|c| c.id == id) else { return vec![] };

  let mut out: Vec<Content> = all
    .iter()
    .filter(|c| c.id != base.id && base.related_content.contains(&c.id))
    .cloned()
    .collect();

  let taken = |out: &[Content], c: &Content| c.id == base.id || out.iter().any(|r| r.id == c.id);

  if out.len() < RELATED_LIMIT {
    let extra: Vec<Content> = all
      .iter()
      .filter(|c| !taken(&out, c) && c.tags.iter().any(|t| base.tags.contains(t)))
      .take(RELATED_LIMIT - out.len())
      .cloned()
      .collect();
    out.extend(extra);
  }
  if out.len() < RELATED_LIMIT {
    let extra: Vec<Content> = all
      .iter()
      .filter(|c| !taken(&out, c) && c.language == base.language)
      .take(RELATED_LIMIT - out.len())
      .cloned()
      .collect();
    out.extend(extra);
  }
  out
}

pub fn trending(all: &[Content]) -> Vec<Content> {
  let mut v = all.to_vec();
  v.sort_by(by_popularity_desc);
  v.truncate(TRENDING_LIMIT);
  v
}

pub fn featured(all: &[Content]) -> Vec<Content> {
  all.iter().filter(|c| c.popularity > FEATURED_MIN_POPULARITY).take(FEATURED_LIMIT).cloned().collect()
}

#[cfg(test)]
pub mod testing {
  use super::*;
  use std::sync::Mutex;

  /// Scripted content source: pops one response per fetch, repeating the last.
  pub struct ScriptedSource {
    responses: Mutex<Vec<Result<Vec<Content>, String>>>,
  }

  impl ScriptedSource {
    pub fn new(responses: Vec<Result<Vec<Content>, String>>) -> Self {
      Self { responses: Mutex::new(responses) }
    }
  }

  #[async_trait]
  impl ContentSource for ScriptedSource {
    async fn fetch_all(&self) -> Result<Vec<Content>, ContentSourceError> {
      let mut r = self.responses.lock().unwrap();
      let next = if r.len() > 1 { r.remove(0) } else { r[0].clone() };
      next.map_err(ContentSourceError::Config)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::testing::ScriptedSource;
  use super::*;
  use crate::seeds::test_content;

  fn ids(v: &[Content]) -> Vec<&str> { v.iter().map(|c| c.id.as_str()).collect() }

  #[tokio::test]
  async fn empty_source_uses_bundled_content_without_error() {
    let repo = ContentRepository::new(Some(Arc::new(ScriptedSource::new(vec![Ok(vec![])]))));
    let load = repo.load_all().await;
    assert_eq!(load.origin, CatalogOrigin::Bundled);
    assert_eq!(load.error, None);
    assert_eq!(repo.all().await.len(), sample_content().len());
  }

  #[tokio::test]
  async fn failing_source_uses_bundled_content_and_reports() {
    let repo = ContentRepository::new(Some(Arc::new(ScriptedSource::new(vec![Err("down".into())]))));
    let load = repo.load_all().await;
    assert_eq!(load.origin, CatalogOrigin::Bundled);
    assert_eq!(load.error.as_deref(), Some(LOAD_FAILED_MESSAGE));
    assert_eq!(repo.last_error().await.as_deref(), Some(LOAD_FAILED_MESSAGE));
  }

  #[tokio::test]
  async fn refresh_keeps_catalog_on_failure_and_reapplies_filters() {
    let first = vec![test_content("a", 1.0), test_content("b", 2.0)];
    let second = vec![test_content("c", 3.0)];
    let src = ScriptedSource::new(vec![Ok(first), Err("flaky".into()), Ok(second)]);
    let repo = ContentRepository::new(Some(Arc::new(src)));
    repo.load_all().await;
    assert_eq!(ids(&repo.set_query("a".into()).await), vec!["a"]);

    let r = repo.refresh().await;
    assert_eq!(r.error.as_deref(), Some(REFRESH_FAILED_MESSAGE));
    assert_eq!(repo.all().await.len(), 2);

    repo.refresh().await;
    assert_eq!(ids(&repo.all().await), vec!["c"]);
    let (_, _, filtered) = repo.filtered().await;
    assert!(filtered.is_empty());
    assert_eq!(repo.reset_filters().await.len(), 1);
  }

  #[tokio::test]
  async fn lookups_tolerate_unknown_ids() {
    let repo = ContentRepository::new(None);
    repo.load_all().await;
    assert!(repo.get_by_id("nope").await.is_none());
    let got = repo.get_by_ids(&["en-myth-1".into(), "nope".into(), "tr-proverb-1".into()]).await;
    assert_eq!(ids(&got), vec!["tr-proverb-1", "en-myth-1"]);
  }

  #[test]
  fn related_prefers_links_then_tags_then_language() {
    let mut base = test_content("base", 1.0);
    base.related_content = vec!["linked".into(), "ghost".into()];
    base.tags = vec!["wisdom".into()];
    let linked = test_content("linked", 1.0);
    let mut tagged = test_content("tagged", 1.0);
    tagged.tags = vec!["wisdom".into()];
    tagged.language = LanguageCode::Ja;
    let same_lang = test_content("same-lang", 1.0);
    let mut other = test_content("other", 1.0);
    other.language = LanguageCode::De;
    let all = vec![other, same_lang, tagged, linked, base];

    assert_eq!(ids(&related(&all, "base")), vec!["linked", "tagged", "same-lang"]);
    assert!(related(&all, "ghost").is_empty());
  }

  #[test]
  fn related_caps_at_five() {
    let mut all: Vec<Content> = (0..9).map(|i| test_content(&format!("c{i}"), 1.0)).collect();
    all[0].tags = vec!["t".into()];
    let r = related(&all, "c0");
    assert_eq!(r.len(), RELATED_LIMIT);
    assert!(r.iter().all(|c| c.id != "c0"));
  }

  #[test]
  fn trending_and_featured() {
    let all = vec![test_content("b", 50.0), test_content("a", 90.0), test_content("c", 81.0), test_content("d", 80.0)];
    assert_eq!(ids(&trending(&all)), vec!["a", "c", "d", "b"]);
    assert_eq!(ids(&featured(&all)), vec!["a", "c"]);
  }
}

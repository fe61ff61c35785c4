//! Remote content source backed by the Supabase REST (PostgREST) API.
//!
//! Reads four tables and joins them client-side into `Content` records:
//!   content_texts      one row per language rendition (becomes one Content)
//!   content_items      type / popularity shared by renditions
//!   content_item_tags  item ↔ tag join table
//!   tags               tag display names
//!
//! Only `content_texts` is required; failures on the other tables are logged and
//! the join proceeds with what is available. We never log the API key.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{error, info, instrument};

use crate::catalog::{ContentSource, ContentSourceError};
use crate::config::ContentSourceCfg;
use crate::domain::{Content, ContentType, LanguageCode};

const DEFAULT_POPULARITY: f64 = 50.0;
const DEFAULT_RATING: f32 = 4.5;

#[derive(Clone)]
pub struct SupabaseSource {
  pub client: reqwest::Client,
  pub base_url: String,
  anon_key: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentTextRow {
  pub id: String,
  pub content_id: Option<String>,
  pub language_code: Option<String>,
  pub title: Option<String>,
  pub text: Option<String>,
  pub romanization: Option<String>,
  pub translation: Option<String>,
  pub meaning: Option<String>,
  pub cultural_context: Option<String>,
  pub region: Option<String>,
  pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentItemRow {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: Option<String>,
  pub popularity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ContentItemTagRow {
  pub content_id: String,
  pub tag_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TagRow {
  pub id: String,
  pub slug: Option<String>,
  pub display_name: Option<String>,
}

impl SupabaseSource {
  /// Build the client when a URL is configured; otherwise None. A missing key
  /// surfaces on the first fetch so the app still starts on bundled content.
  pub fn from_config(cfg: &ContentSourceCfg) -> Option<Self> {
    let base_url = cfg.url.clone().filter(|u| !u.trim().is_empty())?;
    let anon_key = cfg.anon_key.clone().unwrap_or_default();
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs))
      .build()
      .ok()?;
    Some(Self { client, base_url: base_url.trim_end_matches('/').to_string(), anon_key })
  }

  #[instrument(level = "debug", skip(self), fields(base_url = %self.base_url))]
  async fn select_all<T: DeserializeOwned>(&self, table: &str, columns: &str) -> Result<Vec<T>, ContentSourceError> {
    let url = format!("{}/rest/v1/{}?select={}", self.base_url, table, columns);
    let res = self.client.get(&url)
      .header(USER_AGENT, "deyim-backend/0.1")
      .header(ACCEPT, "application/json")
      .header("apikey", &self.anon_key)
      .header(AUTHORIZATION, format!("Bearer {}", self.anon_key))
      .send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      return Err(ContentSourceError::Status { status, body: clip_body(&body) });
    }
    Ok(res.json::<Vec<T>>().await?)
  }

  /// Optional tables degrade to empty on failure.
  async fn select_optional<T: DeserializeOwned>(&self, table: &str, columns: &str) -> Vec<T> {
    match self.select_all(table, columns).await {
      Ok(rows) => rows,
      Err(e) => {
        error!(target: "content", %table, error = %e, "Failed to fetch table; continuing without it");
        vec![]
      }
    }
  }
}

#[async_trait]
impl ContentSource for SupabaseSource {
  #[instrument(level = "info", skip(self))]
  async fn fetch_all(&self) -> Result<Vec<Content>, ContentSourceError> {
    if self.anon_key.is_empty() {
      return Err(ContentSourceError::Config("SUPABASE_ANON_KEY is not set".into()));
    }
    let start = std::time::Instant::now();
    let texts: Vec<ContentTextRow> = self.select_all("content_texts", "*").await?;
    let items: Vec<ContentItemRow> = self.select_optional("content_items", "*").await;
    let links: Vec<ContentItemTagRow> = self.select_optional("content_item_tags", "content_id,tag_id").await;
    let tags: Vec<TagRow> = self.select_optional("tags", "*").await;

    let out = join_rows(texts, &items, &links, &tags, Utc::now());
    info!(target: "content", count = out.len(), elapsed = ?start.elapsed(), "Fetched remote content");
    Ok(out)
  }
}

/// Join the four tables into content records.
pub fn join_rows(
  texts: Vec<ContentTextRow>,
  items: &[ContentItemRow],
  links: &[ContentItemTagRow],
  tags: &[TagRow],
  now: DateTime<Utc>,
) -> Vec<Content> {
  let items_by_id: HashMap<&str, &ContentItemRow> = items.iter().map(|i| (i.id.as_str(), i)).collect();

  let tag_names: HashMap<&str, String> = tags
    .iter()
    .map(|t| {
      let name = t.display_name.clone().or_else(|| t.slug.clone()).unwrap_or_default();
      (t.id.as_str(), name)
    })
    .collect();

  let mut tags_by_item: HashMap<&str, Vec<String>> = HashMap::new();
  for link in links {
    if let Some(name) = tag_names.get(link.tag_id.as_str()).filter(|n| !n.is_empty()) {
      tags_by_item.entry(link.content_id.as_str()).or_default().push(name.clone());
    }
  }

  texts
    .into_iter()
    .map(|row| {
      let item = row.content_id.as_deref().and_then(|id| items_by_id.get(id).copied());
      let item_tags = row.content_id.as_deref().and_then(|id| tags_by_item.get(id)).cloned().unwrap_or_default();
      let created = row.created_at.as_deref().and_then(parse_timestamp).unwrap_or(now);
      Content {
        id: row.id,
        kind: map_content_type(item.and_then(|i| i.kind.as_deref())),
        language: map_language(row.language_code.as_deref()),
        text: row.text.or(row.title).unwrap_or_default(),
        translation: non_empty(row.translation),
        meaning: non_empty(row.meaning),
        cultural_context: non_empty(row.cultural_context),
        romanization: non_empty(row.romanization),
        tags: item_tags,
        region: non_empty(row.region),
        popularity: item.and_then(|i| i.popularity).filter(|p| *p != 0.0).unwrap_or(DEFAULT_POPULARITY),
        favorites_count: 0,
        comments_count: 0,
        rating: DEFAULT_RATING,
        related_content: vec![],
        audio_url: None,
        image_url: None,
        travel_category: None,
        created_at: created,
        updated_at: created,
      }
    })
    .collect()
}

/// Backend type names are snake_case; unknown or missing types read as proverbs.
pub fn map_content_type(raw: Option<&str>) -> ContentType {
  match raw.unwrap_or("") {
    "idiom" => ContentType::Idiom,
    "legend" => ContentType::Legend,
    "myth" => ContentType::Myth,
    "folk_story" => ContentType::FolkStory,
    "epic" => ContentType::Epic,
    "mythology_note" => ContentType::MythologyNote,
    "regional_tale" => ContentType::RegionalTale,
    "meme" => ContentType::Meme,
    "travel_phrase" => ContentType::TravelPhrase,
    "daily_expression" => ContentType::DailyExpression,
    "trending_quote" => ContentType::TrendingQuote,
    _ => ContentType::Proverb,
  }
}

/// Unknown codes read as English.
pub fn map_language(raw: Option<&str>) -> LanguageCode {
  raw.and_then(LanguageCode::from_code).unwrap_or(LanguageCode::En)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s).ok().map(|d| d.with_timezone(&Utc))
}

/// Error bodies can be whole HTML pages; keep logs readable.
fn clip_body(body: &str) -> String {
  const MAX: usize = 300;
  if body.len() <= MAX { return body.to_string(); }
  let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
  format!("{}… ({} bytes total)", &body[..cut], body.len())
}

fn non_empty(s: Option<String>) -> Option<String> {
  s.filter(|v| !v.is_empty())
}

//! Domain models: content records, the user's progress sets, gamification counters,
//! achievements, the daily queue, settings and filter options.
//!
//! Field names serialize in camelCase so persisted documents stay readable by the app.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kinds of learnable content.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
  Proverb,
  Idiom,
  Legend,
  Myth,
  FolkStory,
  Epic,
  MythologyNote,
  RegionalTale,
  Meme,
  TravelPhrase,
  DailyExpression,
  #[serde(rename = "trending_quote")]
  TrendingQuote,
}

/// Languages content can be written in.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
  Tr, En, De, Fr, Es, It, Pt, Ru, Ja, Zh, Ar,
}

impl LanguageCode {
  pub const ALL: [LanguageCode; 11] = [
    LanguageCode::Tr, LanguageCode::En, LanguageCode::De, LanguageCode::Fr,
    LanguageCode::Es, LanguageCode::It, LanguageCode::Pt, LanguageCode::Ru,
    LanguageCode::Ja, LanguageCode::Zh, LanguageCode::Ar,
  ];

  pub fn code(self) -> &'static str {
    match self {
      LanguageCode::Tr => "tr",
      LanguageCode::En => "en",
      LanguageCode::De => "de",
      LanguageCode::Fr => "fr",
      LanguageCode::Es => "es",
      LanguageCode::It => "it",
      LanguageCode::Pt => "pt",
      LanguageCode::Ru => "ru",
      LanguageCode::Ja => "ja",
      LanguageCode::Zh => "zh",
      LanguageCode::Ar => "ar",
    }
  }

  pub fn from_code(code: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|l| l.code() == code)
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TravelCategory {
  Greetings,
  Directions,
  Restaurant,
  Emergencies,
  SmallTalk,
}

/// A single piece of learnable material. Immutable once loaded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Content {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: ContentType,
  pub language: LanguageCode,
  pub text: String,
  #[serde(default)] pub translation: Option<String>,
  #[serde(default)] pub meaning: Option<String>,
  #[serde(default)] pub cultural_context: Option<String>,
  #[serde(default)] pub romanization: Option<String>,
  #[serde(default)] pub tags: Vec<String>,
  #[serde(default)] pub region: Option<String>,
  pub popularity: f64,
  #[serde(default)] pub favorites_count: u32,
  #[serde(default)] pub comments_count: u32,
  #[serde(default)] pub rating: f32,
  /// Ids of other content; may point outside the current catalog.
  #[serde(default)] pub related_content: Vec<String>,
  #[serde(default)] pub audio_url: Option<String>,
  #[serde(default)] pub image_url: Option<String>,
  #[serde(default)] pub travel_category: Option<TravelCategory>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Content {
  /// Text used as the answer when quizzing this item.
  pub fn answer_text(&self) -> Option<&str> {
    self.meaning.as_deref()
      .filter(|s| !s.trim().is_empty())
      .or_else(|| self.translation.as_deref().filter(|s| !s.trim().is_empty()))
  }
}

/// Insertion-ordered set of content ids with O(1) membership.
/// Serialized as a plain JSON array; duplicates in input are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct IdSet {
  order: Vec<String>,
  index: HashSet<String>,
}

impl IdSet {
  pub fn contains(&self, id: &str) -> bool { self.index.contains(id) }
  pub fn len(&self) -> usize { self.order.len() }
  pub fn is_empty(&self) -> bool { self.order.is_empty() }
  pub fn iter(&self) -> impl Iterator<Item = &String> { self.order.iter() }
  pub fn as_slice(&self) -> &[String] { &self.order }

  /// Append if absent. Returns true when the set changed.
  pub fn insert(&mut self, id: &str) -> bool {
    if !self.index.insert(id.to_string()) {
      return false;
    }
    self.order.push(id.to_string());
    true
  }

  /// Returns true when the id was present.
  pub fn remove(&mut self, id: &str) -> bool {
    if !self.index.remove(id) {
      return false;
    }
    self.order.retain(|x| x != id);
    true
  }

  /// Move (or insert) `id` to the front, keeping at most `cap` ids.
  pub fn promote(&mut self, id: &str, cap: usize) {
    self.order.retain(|x| x != id);
    self.order.insert(0, id.to_string());
    self.order.truncate(cap);
    self.index = self.order.iter().cloned().collect();
  }
}

impl From<Vec<String>> for IdSet {
  fn from(ids: Vec<String>) -> Self {
    let mut set = IdSet::default();
    for id in &ids {
      set.insert(id);
    }
    set
  }
}

impl From<IdSet> for Vec<String> {
  fn from(set: IdSet) -> Self { set.order }
}

impl<const N: usize> From<[&str; N]> for IdSet {
  fn from(ids: [&str; N]) -> Self {
    ids.iter().map(|s| s.to_string()).collect::<Vec<_>>().into()
  }
}

/// Per-user content sets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProgress {
  pub learned_content_ids: IdSet,
  pub bookmarked_ids: IdSet,
  pub downloaded_ids: IdSet,
  /// Most recent first.
  pub recently_viewed_ids: IdSet,
  pub favorited_ids: IdSet,
}

/// Aggregate counters driving points, streaks and achievement progress.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GamificationStats {
  pub total_points: u64,
  pub current_streak: u32,
  pub longest_streak: u32,
  /// `YYYY-MM-DD`, empty before the first login.
  pub last_active_date: String,
  pub quiz_correct_count: u32,
  pub quiz_total_count: u32,
  pub share_count: u32,
  pub learned_count: u32,
  pub daily_challenges_completed: u32,
  pub languages_explored: Vec<LanguageCode>,
  pub travel_modes_completed: Vec<LanguageCode>,
  pub meme_interactions: u32,
}

/// The eight fixed milestones.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum AchievementKey {
  FirstSteps,
  CulturalExplorer,
  WeekWarrior,
  MonthMaster,
  MythHunter,
  SocialButterfly,
  TravelReady,
  MemeWhisperer,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
  pub id: String,
  pub key: AchievementKey,
  pub unlocked: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unlocked_at: Option<DateTime<Utc>>,
  pub progress: u32,
  pub target: u32,
}

impl Achievement {
  /// Completion percentage for display, capped at 100.
  pub fn percent(&self) -> u32 {
    if self.target == 0 { return 100; }
    ((self.progress as u64 * 100) / self.target as u64).min(100) as u32
  }
}

/// Day-scoped set of items to learn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyQueue {
  /// `YYYY-MM-DD`, empty before the first generation.
  pub date: String,
  pub content_ids: Vec<String>,
  pub learned_ids: Vec<String>,
  pub quiz_completed: bool,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
  Light,
  Dark,
  #[default]
  System,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppLanguage {
  #[default]
  Tr,
  En,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
  #[serde(default)] pub theme: ThemePreference,
  #[serde(default)] pub app_language: AppLanguage,
  #[serde(default = "default_true")] pub notifications_enabled: bool,
  #[serde(default = "default_reminder")] pub daily_reminder_time: String,
  #[serde(default = "default_display_name")] pub display_name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub avatar_uri: Option<String>,
}

fn default_true() -> bool { true }
fn default_reminder() -> String { "09:00".into() }
fn default_display_name() -> String { "Kullanıcı".into() }

impl Default for UserSettings {
  fn default() -> Self {
    Self {
      theme: ThemePreference::System,
      app_language: AppLanguage::Tr,
      notifications_enabled: true,
      daily_reminder_time: default_reminder(),
      display_name: default_display_name(),
      avatar_uri: None,
    }
  }
}

/// Partial settings update. Absent fields keep their current value;
/// `avatarUri: null` clears the avatar.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
  pub theme: Option<ThemePreference>,
  pub app_language: Option<AppLanguage>,
  pub notifications_enabled: Option<bool>,
  pub daily_reminder_time: Option<String>,
  pub display_name: Option<String>,
  #[serde(default, deserialize_with = "double_option")]
  pub avatar_uri: Option<Option<String>>,
}

fn double_option<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  Option::<String>::deserialize(de).map(Some)
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
  Alphabetical,
  #[default]
  Popularity,
  DateAdded,
  RecentlyViewed,
}

/// Structured filter. An empty dimension means "no restriction".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterOptions {
  pub languages: Vec<LanguageCode>,
  pub types: Vec<ContentType>,
  pub regions: Vec<String>,
  pub tags: Vec<String>,
  pub sort_by: SortBy,
}

/// Partial filter update merged into the current filters.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPatch {
  pub languages: Option<Vec<LanguageCode>>,
  pub types: Option<Vec<ContentType>>,
  pub regions: Option<Vec<String>>,
  pub tags: Option<Vec<String>>,
  pub sort_by: Option<SortBy>,
}

impl FilterOptions {
  pub fn merge(&mut self, patch: FilterPatch) {
    if let Some(v) = patch.languages { self.languages = v; }
    if let Some(v) = patch.types { self.types = v; }
    if let Some(v) = patch.regions { self.regions = v; }
    if let Some(v) = patch.tags { self.tags = v; }
    if let Some(v) = patch.sort_by { self.sort_by = v; }
  }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
  pub id: String,
  pub display_name: String,
  pub total_points: u64,
  pub rank: u32,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn id_set_drops_duplicates_from_json() {
    let set: IdSet = serde_json::from_str(r#"["a","b","a","c"]"#).unwrap();
    assert_eq!(set.as_slice(), &["a", "b", "c"]);
    assert_eq!(serde_json::to_string(&set).unwrap(), r#"["a","b","c"]"#);
  }

  #[test]
  fn promote_moves_to_front_and_caps() {
    let mut set = IdSet::from(["a", "b", "c"]);
    set.promote("c", 3);
    assert_eq!(set.as_slice(), &["c", "a", "b"]);
    set.promote("d", 3);
    assert_eq!(set.as_slice(), &["d", "c", "a"]);
    assert!(!set.contains("b"));
  }

  #[test]
  fn progress_reads_app_document() {
    let json = r#"{"learnedContentIds":["x"],"bookmarkedIds":[],"downloadedIds":[],"recentlyViewedIds":["y"],"favoritedIds":[]}"#;
    let p: UserProgress = serde_json::from_str(json).unwrap();
    assert!(p.learned_content_ids.contains("x"));
    assert!(p.recently_viewed_ids.contains("y"));
  }

  #[test]
  fn content_type_keeps_legacy_trending_name() {
    assert_eq!(serde_json::to_string(&ContentType::TrendingQuote).unwrap(), "\"trending_quote\"");
    assert_eq!(serde_json::to_string(&ContentType::FolkStory).unwrap(), "\"folkStory\"");
  }

  #[test]
  fn settings_patch_distinguishes_null_avatar() {
    let p: SettingsPatch = serde_json::from_str(r#"{"avatarUri":null}"#).unwrap();
    assert_eq!(p.avatar_uri, Some(None));
    let p: SettingsPatch = serde_json::from_str(r#"{"displayName":"Ada"}"#).unwrap();
    assert_eq!(p.avatar_uri, None);
  }
}

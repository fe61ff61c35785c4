//! Built-in content and mock data.
//!
//! The bundled catalog keeps the app usable when the remote content source is
//! unreachable or empty.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{Content, ContentType, LanguageCode, LeaderboardEntry, TravelCategory};

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).single().unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn item(
  id: &str,
  kind: ContentType,
  language: LanguageCode,
  text: &str,
  translation: &str,
  meaning: &str,
  tags: &[&str],
  popularity: f64,
  created: DateTime<Utc>,
) -> Content {
  let opt = |s: &str| if s.is_empty() { None } else { Some(s.to_string()) };
  Content {
    id: id.into(),
    kind,
    language,
    text: text.into(),
    translation: opt(translation),
    meaning: opt(meaning),
    cultural_context: None,
    romanization: None,
    tags: tags.iter().map(|t| t.to_string()).collect(),
    region: None,
    popularity,
    favorites_count: 0,
    comments_count: 0,
    rating: 4.5,
    related_content: vec![],
    audio_url: None,
    image_url: None,
    travel_category: None,
    created_at: created,
    updated_at: created,
  }
}

/// Fallback catalog used when the remote source yields nothing.
pub fn sample_content() -> Vec<Content> {
  use ContentType::*;
  use LanguageCode::*;

  let mut damla = item(
    "tr-proverb-1", Proverb, Tr,
    "Damlaya damlaya göl olur.",
    "Drop by drop, a lake forms.",
    "Small efforts add up to great results over time.",
    &["patience", "wisdom"], 92.0, at(2024, 1, 5),
  );
  damla.region = Some("Anatolia".into());
  damla.cultural_context = Some("Often said to children saving money or studying.".into());
  damla.related_content = vec!["en-proverb-1".into(), "missing-id".into()];

  let mut rome = item(
    "en-proverb-1", Proverb, En,
    "Rome wasn't built in a day.",
    "", "Important work takes time.",
    &["patience"], 88.0, at(2024, 1, 8),
  );
  rome.region = Some("Europe".into());

  let mut nanakorobi = item(
    "ja-idiom-1", Idiom, Ja,
    "七転び八起き",
    "Fall seven times, stand up eight.",
    "Keep going no matter how many setbacks you face.",
    &["resilience", "wisdom"], 85.0, at(2024, 2, 1),
  );
  nanakorobi.romanization = Some("nana korobi ya oki".into());

  let mut zhi = item(
    "zh-proverb-1", Proverb, Zh,
    "学而不思则罔",
    "Learning without thought is labor lost.",
    "Study must be paired with reflection.",
    &["learning", "wisdom"], 74.0, at(2024, 2, 12),
  );
  zhi.region = Some("China".into());

  let mut keloglan = item(
    "tr-folk-1", FolkStory, Tr,
    "Keloğlan ve Dev",
    "Keloglan and the Giant",
    "A clever boy outwits a giant with wit instead of strength.",
    &["folklore", "cleverness"], 67.0, at(2024, 3, 3),
  );
  keloglan.region = Some("Anatolia".into());

  let prometheus = item(
    "en-myth-1", Myth, En,
    "Prometheus steals fire",
    "", "A titan defies the gods to give humanity fire.",
    &["mythology", "sacrifice"], 81.0, at(2024, 3, 15),
  );

  let mut kolay = item(
    "tr-daily-1", DailyExpression, Tr,
    "Kolay gelsin!",
    "May it come easy!",
    "Said to someone who is working.",
    &["courtesy"], 78.0, at(2024, 4, 1),
  );
  kolay.related_content = vec!["tr-proverb-1".into()];

  let mut bonjour = item(
    "fr-travel-1", TravelPhrase, Fr,
    "Bonjour, comment allez-vous ?",
    "Hello, how are you?",
    "", &["travel"], 60.0, at(2024, 4, 10),
  );
  bonjour.travel_category = Some(TravelCategory::Greetings);

  let mut addition = item(
    "fr-travel-2", TravelPhrase, Fr,
    "L'addition, s'il vous plaît.",
    "The bill, please.",
    "", &["travel", "food"], 58.0, at(2024, 4, 11),
  );
  addition.travel_category = Some(TravelCategory::Restaurant);

  let mut wo = item(
    "es-travel-1", TravelPhrase, Es,
    "¿Dónde está la estación?",
    "Where is the station?",
    "", &["travel"], 55.0, at(2024, 4, 12),
  );
  wo.travel_category = Some(TravelCategory::Directions);

  let meme = item(
    "en-meme-1", Meme, En,
    "This is fine.",
    "", "Pretending everything is okay while chaos unfolds.",
    &["humor"], 83.0, at(2024, 5, 2),
  );

  vec![damla, rome, nanakorobi, zhi, keloglan, prometheus, kolay, bonjour, addition, wo, meme]
}

/// Fixed leaderboard shown until a real ranking service exists.
pub fn mock_leaderboard() -> Vec<LeaderboardEntry> {
  [
    ("Ayse K.", 15420), ("Mehmet A.", 14230), ("Zeynep Y.", 13890), ("Ali B.", 12450),
    ("Fatma S.", 11200), ("Can D.", 10890), ("Elif G.", 9870), ("Emre T.", 8760),
    ("Selin M.", 7650), ("Burak N.", 6540),
  ]
  .iter()
  .enumerate()
  .map(|(i, (name, points))| LeaderboardEntry {
    id: (i + 1).to_string(),
    display_name: name.to_string(),
    total_points: *points,
    rank: i as u32 + 1,
  })
  .collect()
}

/// Minimal English proverb for tests; callers tweak the fields they care about.
#[cfg(test)]
pub fn test_content(id: &str, popularity: f64) -> Content {
  item(id, ContentType::Proverb, LanguageCode::En, id, "", "", &[], popularity, at(2024, 1, 1))
}

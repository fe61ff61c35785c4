//! Achievement evaluator: a pure re-derivation of milestone progress from the
//! current progress and stats snapshots.
//!
//! Unlocking is one-way. An unlocked achievement keeps the progress and timestamp
//! it had when it unlocked; later passes never touch it.

use chrono::{DateTime, Utc};

use crate::domain::{Achievement, AchievementKey, GamificationStats, UserProgress};

impl AchievementKey {
  pub const ALL: [AchievementKey; 8] = [
    AchievementKey::FirstSteps,
    AchievementKey::CulturalExplorer,
    AchievementKey::WeekWarrior,
    AchievementKey::MonthMaster,
    AchievementKey::MythHunter,
    AchievementKey::SocialButterfly,
    AchievementKey::TravelReady,
    AchievementKey::MemeWhisperer,
  ];

  pub fn id(self) -> &'static str {
    match self {
      AchievementKey::FirstSteps => "1",
      AchievementKey::CulturalExplorer => "2",
      AchievementKey::WeekWarrior => "3",
      AchievementKey::MonthMaster => "4",
      AchievementKey::MythHunter => "5",
      AchievementKey::SocialButterfly => "6",
      AchievementKey::TravelReady => "7",
      AchievementKey::MemeWhisperer => "8",
    }
  }

  pub fn target(self) -> u32 {
    match self {
      AchievementKey::FirstSteps => 5,
      AchievementKey::CulturalExplorer => 5,
      AchievementKey::WeekWarrior => 7,
      AchievementKey::MonthMaster => 30,
      AchievementKey::MythHunter => 20,
      AchievementKey::SocialButterfly => 10,
      AchievementKey::TravelReady => 3,
      AchievementKey::MemeWhisperer => 20,
    }
  }

  /// Current value of the counter this milestone tracks.
  pub fn counter(self, progress: &UserProgress, stats: &GamificationStats) -> u32 {
    match self {
      AchievementKey::FirstSteps => progress.learned_content_ids.len() as u32,
      AchievementKey::CulturalExplorer => stats.languages_explored.len() as u32,
      AchievementKey::WeekWarrior | AchievementKey::MonthMaster => stats.current_streak,
      AchievementKey::MythHunter => stats.learned_count,
      AchievementKey::SocialButterfly => stats.share_count,
      AchievementKey::TravelReady => stats.travel_modes_completed.len() as u32,
      AchievementKey::MemeWhisperer => stats.meme_interactions,
    }
  }
}

pub fn default_achievements() -> Vec<Achievement> {
  AchievementKey::ALL.iter().map(|k| fresh(*k)).collect()
}

fn fresh(key: AchievementKey) -> Achievement {
  Achievement {
    id: key.id().to_string(),
    key,
    unlocked: false,
    unlocked_at: None,
    progress: 0,
    target: key.target(),
  }
}

/// Bring a loaded list back to the fixed table: one entry per key, in key order,
/// missing keys added fresh. Persisted progress and unlock state are kept.
pub fn normalize(loaded: Vec<Achievement>) -> Vec<Achievement> {
  AchievementKey::ALL
    .iter()
    .map(|k| loaded.iter().find(|a| a.key == *k).cloned().unwrap_or_else(|| fresh(*k)))
    .collect()
}

/// One evaluation pass. Returns the achievements that unlocked during this pass.
pub fn evaluate(
  achievements: &mut [Achievement],
  progress: &UserProgress,
  stats: &GamificationStats,
  now: DateTime<Utc>,
) -> Vec<Achievement> {
  let mut newly_unlocked = Vec::new();
  for a in achievements.iter_mut() {
    if a.unlocked {
      continue;
    }
    a.progress = a.key.counter(progress, stats);
    if a.progress >= a.target {
      a.unlocked = true;
      a.unlocked_at = Some(now);
      newly_unlocked.push(a.clone());
    }
  }
  newly_unlocked
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  use crate::domain::LanguageCode;

  fn t(h: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 5, 10, h, 0, 0).unwrap() }

  #[test]
  fn progress_tracks_counters_until_unlock() {
    let mut list = default_achievements();
    let mut progress = UserProgress::default();
    progress.add_learned("a");
    let unlocked = evaluate(&mut list, &progress, &GamificationStats::default(), t(1));
    assert!(unlocked.is_empty());
    let first = list.iter().find(|a| a.key == AchievementKey::FirstSteps).unwrap();
    assert_eq!((first.progress, first.target, first.unlocked), (1, 5, false));
  }

  #[test]
  fn streak_feeds_two_milestones() {
    let mut list = default_achievements();
    let stats = GamificationStats { current_streak: 7, ..Default::default() };
    let unlocked = evaluate(&mut list, &UserProgress::default(), &stats, t(1));
    assert_eq!(unlocked.len(), 1);
    assert_eq!(unlocked[0].key, AchievementKey::WeekWarrior);
    let month = list.iter().find(|a| a.key == AchievementKey::MonthMaster).unwrap();
    assert_eq!(month.progress, 7);
    assert!(!month.unlocked);
  }

  #[test]
  fn unlocked_achievements_are_frozen() {
    let mut list = default_achievements();
    let mut stats = GamificationStats { share_count: 10, ..Default::default() };
    evaluate(&mut list, &UserProgress::default(), &stats, t(1));
    let before = list[5].clone();
    assert!(before.unlocked);
    assert_eq!(before.unlocked_at, Some(t(1)));

    stats.share_count = 25;
    let again = evaluate(&mut list, &UserProgress::default(), &stats, t(9));
    assert!(again.is_empty());
    assert_eq!(list[5], before);
  }

  fn find(list: &[Achievement], key: AchievementKey) -> &Achievement {
    list.iter().find(|a| a.key == key).unwrap()
  }

  #[test]
  fn myth_hunter_counts_learn_events_not_the_learned_set() {
    let mut list = default_achievements();
    let mut progress = UserProgress::default();
    progress.add_learned("a");
    let stats = GamificationStats { learned_count: 20, ..Default::default() };
    let unlocked = evaluate(&mut list, &progress, &stats, t(1));
    assert_eq!(unlocked.len(), 1);
    assert_eq!(unlocked[0].key, AchievementKey::MythHunter);
    assert_eq!(find(&list, AchievementKey::FirstSteps).progress, 1);
  }

  #[test]
  fn exploration_counters_feed_their_milestones() {
    let mut list = default_achievements();
    let stats = GamificationStats {
      languages_explored: vec![LanguageCode::Tr, LanguageCode::En, LanguageCode::Ja, LanguageCode::Fr],
      travel_modes_completed: vec![LanguageCode::Tr, LanguageCode::En, LanguageCode::De],
      meme_interactions: 19,
      ..Default::default()
    };
    let unlocked = evaluate(&mut list, &UserProgress::default(), &stats, t(1));
    assert_eq!(unlocked.iter().map(|a| a.key).collect::<Vec<_>>(), vec![AchievementKey::TravelReady]);
    assert_eq!(find(&list, AchievementKey::CulturalExplorer).progress, 4);
    assert_eq!(find(&list, AchievementKey::MemeWhisperer).progress, 19);

    let stats = GamificationStats {
      languages_explored: vec![LanguageCode::Tr, LanguageCode::En, LanguageCode::Ja, LanguageCode::Fr, LanguageCode::Zh],
      meme_interactions: 20,
      ..stats
    };
    let unlocked = evaluate(&mut list, &UserProgress::default(), &stats, t(2));
    let keys: Vec<_> = unlocked.iter().map(|a| a.key).collect();
    assert_eq!(keys, vec![AchievementKey::CulturalExplorer, AchievementKey::MemeWhisperer]);
  }

  #[test]
  fn normalize_fills_missing_and_drops_duplicates() {
    let mut kept = fresh(AchievementKey::TravelReady);
    kept.progress = 2;
    let loaded = vec![kept.clone(), kept.clone()];
    let list = normalize(loaded);
    assert_eq!(list.len(), 8);
    assert_eq!(list[6], kept);
    assert_eq!(list[0], fresh(AchievementKey::FirstSteps));
  }
}

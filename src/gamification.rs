//! Points, streaks, quiz counters and exploration counters.
//!
//! Point awards are additive only. Amounts come from `PointsTable` (configurable).

use chrono::{Duration, NaiveDate};
use serde::Deserialize;

use crate::clock::{date_key, parse_date_key};
use crate::domain::{GamificationStats, LanguageCode};

/// Award amounts per action.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PointsTable {
  pub daily_login: u64,
  pub learn_content: u64,
  pub daily_challenge: u64,
  pub view_content: u64,
  pub quiz_correct: u64,
  pub bookmark: u64,
  pub share: u64,
}

impl Default for PointsTable {
  fn default() -> Self {
    Self {
      daily_login: 10,
      learn_content: 5,
      daily_challenge: 20,
      view_content: 1,
      quiz_correct: 10,
      bookmark: 2,
      share: 3,
    }
  }
}

/// What a login did to the streak.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
  /// Already recorded today; nothing changed.
  AlreadyRecorded,
  Continued { streak: u32 },
  Started,
}

impl GamificationStats {
  pub fn award(&mut self, points: u64) {
    self.total_points = self.total_points.saturating_add(points);
  }

  pub fn record_daily_login(&mut self, today: NaiveDate, points: &PointsTable) -> LoginOutcome {
    let today_key = date_key(today);
    if self.last_active_date == today_key {
      return LoginOutcome::AlreadyRecorded;
    }

    let yesterday = date_key(today - Duration::days(1));
    let outcome = if !self.last_active_date.is_empty() && self.last_active_date == yesterday {
      self.current_streak += 1;
      LoginOutcome::Continued { streak: self.current_streak }
    } else {
      self.current_streak = 1;
      LoginOutcome::Started
    };

    self.longest_streak = self.longest_streak.max(self.current_streak);
    self.award(points.daily_login);
    self.last_active_date = today_key;
    outcome
  }

  pub fn record_quiz_answer(&mut self, correct: bool, points: &PointsTable) {
    self.quiz_total_count += 1;
    if correct {
      self.quiz_correct_count += 1;
      self.award(points.quiz_correct);
    }
  }

  pub fn record_share(&mut self, points: &PointsTable) {
    self.award(points.share);
    self.share_count += 1;
  }

  /// First-ever learn of an item.
  pub fn record_learned(&mut self, points: &PointsTable) {
    self.award(points.learn_content);
    self.learned_count += 1;
  }

  pub fn record_daily_challenge(&mut self, points: &PointsTable) {
    self.award(points.daily_challenge);
    self.daily_challenges_completed += 1;
  }

  /// Append-once. Returns true when the language was new.
  pub fn add_language_explored(&mut self, lang: LanguageCode) -> bool {
    push_unique(&mut self.languages_explored, lang)
  }

  pub fn complete_travel_mode(&mut self, lang: LanguageCode) -> bool {
    push_unique(&mut self.travel_modes_completed, lang)
  }

  pub fn increment_meme_interactions(&mut self) {
    self.meme_interactions += 1;
  }

  /// Rounded percentage of correct quiz answers.
  pub fn quiz_accuracy(&self) -> u32 {
    if self.quiz_total_count == 0 { return 0; }
    ((self.quiz_correct_count as f64 / self.quiz_total_count as f64) * 100.0).round() as u32
  }

  /// Calendar days covered by the current streak, newest first.
  pub fn streak_dates(&self) -> Vec<String> {
    let Some(last) = parse_date_key(&self.last_active_date) else { return vec![] };
    (0..self.current_streak as i64)
      .map(|i| date_key(last - Duration::days(i)))
      .collect()
  }
}

fn push_unique(list: &mut Vec<LanguageCode>, lang: LanguageCode) -> bool {
  if list.contains(&lang) {
    return false;
  }
  list.push(lang);
  true
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 5, d).unwrap() }

  #[test]
  fn first_login_starts_streak() {
    let pts = PointsTable::default();
    let mut s = GamificationStats::default();
    assert_eq!(s.record_daily_login(day(10), &pts), LoginOutcome::Started);
    assert_eq!(s.current_streak, 1);
    assert_eq!(s.longest_streak, 1);
    assert_eq!(s.total_points, pts.daily_login);
    assert_eq!(s.last_active_date, "2024-05-10");
  }

  #[test]
  fn consecutive_day_increments_streak() {
    let pts = PointsTable::default();
    let mut s = GamificationStats { current_streak: 3, longest_streak: 3, last_active_date: "2024-05-09".into(), ..Default::default() };
    assert_eq!(s.record_daily_login(day(10), &pts), LoginOutcome::Continued { streak: 4 });
    assert_eq!(s.current_streak, 4);
    assert_eq!(s.longest_streak, 4);
  }

  #[test]
  fn gap_resets_streak_but_keeps_longest() {
    let pts = PointsTable::default();
    let mut s = GamificationStats { current_streak: 6, longest_streak: 9, last_active_date: "2024-05-08".into(), ..Default::default() };
    assert_eq!(s.record_daily_login(day(10), &pts), LoginOutcome::Started);
    assert_eq!(s.current_streak, 1);
    assert_eq!(s.longest_streak, 9);
  }

  #[test]
  fn same_day_login_is_noop() {
    let pts = PointsTable::default();
    let mut s = GamificationStats::default();
    s.record_daily_login(day(10), &pts);
    let before = s.clone();
    assert_eq!(s.record_daily_login(day(10), &pts), LoginOutcome::AlreadyRecorded);
    assert_eq!(s, before);
  }

  #[test]
  fn month_boundary_counts_as_consecutive() {
    let pts = PointsTable::default();
    let mut s = GamificationStats { current_streak: 1, longest_streak: 1, last_active_date: "2024-04-30".into(), ..Default::default() };
    s.record_daily_login(day(1), &pts);
    assert_eq!(s.current_streak, 2);
  }

  #[test]
  fn quiz_answers_award_only_when_correct() {
    let pts = PointsTable::default();
    let mut s = GamificationStats::default();
    s.record_quiz_answer(true, &pts);
    s.record_quiz_answer(false, &pts);
    s.record_quiz_answer(false, &pts);
    assert_eq!(s.quiz_total_count, 3);
    assert_eq!(s.quiz_correct_count, 1);
    assert_eq!(s.total_points, pts.quiz_correct);
    assert_eq!(s.quiz_accuracy(), 33);
  }

  #[test]
  fn explored_languages_append_once() {
    let mut s = GamificationStats::default();
    assert!(s.add_language_explored(LanguageCode::Ja));
    assert!(!s.add_language_explored(LanguageCode::Ja));
    assert!(s.complete_travel_mode(LanguageCode::De));
    assert!(!s.complete_travel_mode(LanguageCode::De));
    assert_eq!(s.languages_explored, vec![LanguageCode::Ja]);
  }

  #[test]
  fn streak_dates_walk_back_from_last_active() {
    let s = GamificationStats { current_streak: 3, last_active_date: "2024-05-02".into(), ..Default::default() };
    assert_eq!(s.streak_dates(), vec!["2024-05-02", "2024-05-01", "2024-04-30"]);
    assert!(GamificationStats::default().streak_dates().is_empty());
  }
}

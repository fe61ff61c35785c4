//! Daily queue: up to five unlearned items picked once per calendar day.
//!
//! The pick is not seeded. Same-day stability comes from the guard in `generate`,
//! not from reproducible randomness.

use chrono::NaiveDate;
use rand::{seq::SliceRandom, Rng};

use crate::clock::date_key;
use crate::domain::{Content, DailyQueue, IdSet};

pub const DAILY_QUEUE_SIZE: usize = 5;

impl DailyQueue {
  /// Whether the stored queue already covers `today`.
  pub fn is_current(&self, today: NaiveDate) -> bool {
    self.date == date_key(today) && !self.content_ids.is_empty()
  }

  /// Replace the queue with a fresh pick unless today's queue already exists.
  /// Returns true when a new queue was generated.
  pub fn generate<R: Rng + ?Sized>(
    &mut self,
    catalog: &[Content],
    learned: &IdSet,
    today: NaiveDate,
    rng: &mut R,
  ) -> bool {
    if self.is_current(today) {
      return false;
    }
    let mut unlearned: Vec<&Content> = catalog.iter().filter(|c| !learned.contains(&c.id)).collect();
    unlearned.shuffle(rng);

    *self = DailyQueue {
      date: date_key(today),
      content_ids: unlearned.into_iter().take(DAILY_QUEUE_SIZE).map(|c| c.id.clone()).collect(),
      learned_ids: vec![],
      quiz_completed: false,
    };
    true
  }

  /// Returns false when already marked today.
  pub fn mark_learned(&mut self, id: &str) -> bool {
    if self.learned_ids.iter().any(|x| x == id) {
      return false;
    }
    self.learned_ids.push(id.to_string());
    true
  }

  /// One-way. Returns true on the false→true transition.
  pub fn complete_quiz(&mut self) -> bool {
    if self.quiz_completed {
      return false;
    }
    self.quiz_completed = true;
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::sample_content;

  fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 5, d).unwrap() }

  #[test]
  fn generates_five_unlearned_items() {
    let catalog = sample_content();
    let learned = IdSet::from([catalog[0].id.as_str(), catalog[1].id.as_str()]);
    let mut q = DailyQueue::default();
    assert!(q.generate(&catalog, &learned, day(10), &mut rand::thread_rng()));
    assert_eq!(q.date, "2024-05-10");
    assert_eq!(q.content_ids.len(), DAILY_QUEUE_SIZE);
    assert!(q.content_ids.iter().all(|id| !learned.contains(id)));
    let mut uniq = q.content_ids.clone();
    uniq.sort();
    uniq.dedup();
    assert_eq!(uniq.len(), DAILY_QUEUE_SIZE);
  }

  #[test]
  fn same_day_generation_is_noop() {
    let catalog = sample_content();
    let mut q = DailyQueue::default();
    q.generate(&catalog, &IdSet::default(), day(10), &mut rand::thread_rng());
    let first = q.content_ids[0].clone();
    q.mark_learned(&first);
    let before = q.clone();
    assert!(!q.generate(&catalog, &IdSet::default(), day(10), &mut rand::thread_rng()));
    assert_eq!(q, before);
  }

  #[test]
  fn new_day_replaces_queue() {
    let catalog = sample_content();
    let mut q = DailyQueue::default();
    q.generate(&catalog, &IdSet::default(), day(10), &mut rand::thread_rng());
    let first = q.content_ids[0].clone();
    q.mark_learned(&first);
    q.complete_quiz();
    assert!(q.generate(&catalog, &IdSet::default(), day(11), &mut rand::thread_rng()));
    assert_eq!(q.date, "2024-05-11");
    assert!(q.learned_ids.is_empty());
    assert!(!q.quiz_completed);
  }

  #[test]
  fn small_catalog_yields_short_queue_and_empty_one_regenerates() {
    let catalog: Vec<Content> = sample_content().into_iter().take(2).collect();
    let mut q = DailyQueue::default();
    q.generate(&catalog, &IdSet::default(), day(10), &mut rand::thread_rng());
    assert_eq!(q.content_ids.len(), 2);

    let all_learned = IdSet::from([catalog[0].id.as_str(), catalog[1].id.as_str()]);
    let mut empty = DailyQueue::default();
    empty.generate(&catalog, &all_learned, day(10), &mut rand::thread_rng());
    assert!(empty.content_ids.is_empty());
    // Today's queue is empty, so the guard does not hold and a retry re-picks.
    assert!(empty.generate(&catalog, &IdSet::default(), day(10), &mut rand::thread_rng()));
    assert_eq!(empty.content_ids.len(), 2);
  }

  #[test]
  fn mark_learned_and_quiz_are_idempotent() {
    let mut q = DailyQueue::default();
    assert!(q.mark_learned("a"));
    assert!(!q.mark_learned("a"));
    assert!(q.complete_quiz());
    assert!(!q.complete_quiz());
  }
}

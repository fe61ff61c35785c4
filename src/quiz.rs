//! Daily quiz: one multiple-choice question per daily item.
//!
//! The right answer is the item's meaning (or translation). Distractors come from
//! the other daily items, so a queue of one item yields a single-option question.

use rand::{seq::SliceRandom, Rng};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::Content;

const MAX_DISTRACTORS: usize = 3;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
  pub id: String,
  pub content_id: String,
  pub question: String,
  pub options: Vec<String>,
  pub correct_index: usize,
}

pub fn build_questions<R: Rng + ?Sized>(items: &[Content], rng: &mut R) -> Vec<QuizQuestion> {
  items
    .iter()
    .filter_map(|item| {
      let correct = item.answer_text()?.to_string();
      let mut options = vec![correct.clone()];
      for other in items.iter().filter(|c| c.id != item.id) {
        if options.len() > MAX_DISTRACTORS { break; }
        if let Some(ans) = other.answer_text() {
          if !options.iter().any(|o| o == ans) {
            options.push(ans.to_string());
          }
        }
      }
      options.shuffle(rng);
      let correct_index = options.iter().position(|o| *o == correct)?;
      Some(QuizQuestion {
        id: Uuid::new_v4().to_string(),
        content_id: item.id.clone(),
        question: item.text.clone(),
        options,
        correct_index,
      })
    })
    .collect()
}

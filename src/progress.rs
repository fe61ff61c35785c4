//! Progression store: the user's learned / bookmarked / downloaded / favorited /
//! recently-viewed sets. Each operation reports whether a state transition happened
//! so the caller can award points exactly once per transition.

use crate::domain::UserProgress;

pub const RECENTLY_VIEWED_CAP: usize = 50;

/// Result of a toggle: exactly one state flip per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
  Added,
  Removed,
}

impl Toggle {
  pub fn is_added(self) -> bool { matches!(self, Toggle::Added) }
}

impl UserProgress {
  /// Returns true only on the first-ever learn of `id`.
  pub fn add_learned(&mut self, id: &str) -> bool {
    self.learned_content_ids.insert(id)
  }

  pub fn toggle_bookmark(&mut self, id: &str) -> Toggle {
    toggle(&mut self.bookmarked_ids, id)
  }

  pub fn toggle_favorite(&mut self, id: &str) -> Toggle {
    toggle(&mut self.favorited_ids, id)
  }

  pub fn add_downloaded(&mut self, id: &str) -> bool {
    self.downloaded_ids.insert(id)
  }

  pub fn remove_downloaded(&mut self, id: &str) -> bool {
    self.downloaded_ids.remove(id)
  }

  /// Move-to-front with the 50 most recent kept.
  pub fn record_view(&mut self, id: &str) {
    self.recently_viewed_ids.promote(id, RECENTLY_VIEWED_CAP);
  }

  pub fn is_learned(&self, id: &str) -> bool { self.learned_content_ids.contains(id) }

  /// Enforce the cap on documents written by older builds.
  pub fn normalize(&mut self) {
    if self.recently_viewed_ids.len() > RECENTLY_VIEWED_CAP {
      let keep: Vec<String> = self.recently_viewed_ids.iter().take(RECENTLY_VIEWED_CAP).cloned().collect();
      self.recently_viewed_ids = keep.into();
    }
  }
}

fn toggle(set: &mut crate::domain::IdSet, id: &str) -> Toggle {
  if set.remove(id) { Toggle::Removed } else { set.insert(id); Toggle::Added }
}

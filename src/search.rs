//! Filter/search: derive a filtered, sorted view from a base catalog.

use std::cmp::Ordering;

use crate::domain::{Content, FilterOptions, SortBy};

/// Query match, then language / type / region / tag filters, then sort.
/// Dimensions combine with AND; values inside a dimension with OR.
pub fn apply(catalog: &[Content], query: &str, filters: &FilterOptions) -> Vec<Content> {
  let needle = query.trim().to_lowercase();
  let mut result: Vec<Content> = catalog
    .iter()
    .filter(|c| needle.is_empty() || matches_query(c, &needle))
    .filter(|c| filters.languages.is_empty() || filters.languages.contains(&c.language))
    .filter(|c| filters.types.is_empty() || filters.types.contains(&c.kind))
    .filter(|c| {
      filters.regions.is_empty()
        || c.region.as_ref().map_or(false, |r| filters.regions.contains(r))
    })
    .filter(|c| filters.tags.is_empty() || c.tags.iter().any(|t| filters.tags.contains(t)))
    .cloned()
    .collect();

  sort(&mut result, filters.sort_by);
  result
}

/// Stable sort. `RecentlyViewed` has no comparator and keeps catalog order.
pub fn sort(items: &mut [Content], sort_by: SortBy) {
  match sort_by {
    SortBy::Alphabetical => items.sort_by(|a, b| alphabetical(&a.text, &b.text)),
    SortBy::Popularity => items.sort_by(by_popularity_desc),
    SortBy::DateAdded => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    SortBy::RecentlyViewed => {}
  }
}

pub fn by_popularity_desc(a: &Content, b: &Content) -> Ordering {
  b.popularity.total_cmp(&a.popularity)
}

fn alphabetical(a: &str, b: &str) -> Ordering {
  a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

fn matches_query(c: &Content, needle: &str) -> bool {
  let hit = |s: &str| s.to_lowercase().contains(needle);
  hit(&c.text)
    || c.translation.as_deref().map_or(false, hit)
    || c.meaning.as_deref().map_or(false, hit)
    || c.tags.iter().any(|t| hit(t))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ContentType, LanguageCode};
  use crate::seeds::{sample_content, test_content};

  fn ids(v: &[Content]) -> Vec<&str> { v.iter().map(|c| c.id.as_str()).collect() }

  #[test]
  fn empty_query_and_filters_equal_default_sort() {
    let catalog = sample_content();
    let mut expected = catalog.clone();
    sort(&mut expected, SortBy::default());
    assert_eq!(apply(&catalog, "", &FilterOptions::default()), expected);
    assert_eq!(apply(&catalog, "   ", &FilterOptions::default()), expected);
  }

  #[test]
  fn query_matches_text_translation_meaning_and_tags() {
    let mut a = test_content("a", 10.0);
    a.text = "Damlaya damlaya göl olur".into();
    let mut b = test_content("b", 20.0);
    b.translation = Some("Drop by DROP".into());
    let mut c = test_content("c", 30.0);
    c.tags = vec!["Patience".into()];
    let d = test_content("d", 40.0);
    let catalog = vec![a, b, c, d];

    assert_eq!(ids(&apply(&catalog, "GÖL", &FilterOptions::default())), vec!["a"]);
    assert_eq!(ids(&apply(&catalog, "drop", &FilterOptions::default())), vec!["b"]);
    assert_eq!(ids(&apply(&catalog, " patience ", &FilterOptions::default())), vec!["c"]);
  }

  #[test]
  fn dimensions_and_together_values_or_within() {
    let mut a = test_content("a", 1.0);
    a.language = LanguageCode::Tr;
    a.kind = ContentType::Proverb;
    let mut b = test_content("b", 2.0);
    b.language = LanguageCode::En;
    b.kind = ContentType::Proverb;
    let mut c = test_content("c", 3.0);
    c.language = LanguageCode::Ja;
    c.kind = ContentType::Idiom;
    let catalog = vec![a, b, c];

    let f = FilterOptions { languages: vec![LanguageCode::Tr, LanguageCode::Ja], ..Default::default() };
    assert_eq!(ids(&apply(&catalog, "", &f)), vec!["c", "a"]);

    let f = FilterOptions {
      languages: vec![LanguageCode::Tr, LanguageCode::Ja],
      types: vec![ContentType::Proverb],
      ..Default::default()
    };
    assert_eq!(ids(&apply(&catalog, "", &f)), vec!["a"]);
  }

  #[test]
  fn region_filter_drops_items_without_region() {
    let mut a = test_content("a", 1.0);
    a.region = Some("Anatolia".into());
    let b = test_content("b", 2.0);
    let catalog = vec![a, b];
    let f = FilterOptions { regions: vec!["Anatolia".into()], ..Default::default() };
    assert_eq!(ids(&apply(&catalog, "", &f)), vec!["a"]);
  }

  #[test]
  fn tag_filter_needs_one_shared_tag() {
    let mut a = test_content("a", 1.0);
    a.tags = vec!["x".into(), "y".into()];
    let mut b = test_content("b", 2.0);
    b.tags = vec!["z".into()];
    let c = test_content("c", 3.0);
    let mut d = test_content("d", 4.0);
    d.tags = vec!["y".into()];
    d.kind = ContentType::Idiom;
    let catalog = vec![a, b, c, d];

    let f = FilterOptions { tags: vec!["y".into(), "q".into()], ..Default::default() };
    assert_eq!(ids(&apply(&catalog, "", &f)), vec!["d", "a"]);

    let f = FilterOptions {
      tags: vec!["y".into(), "q".into()],
      types: vec![ContentType::Proverb],
      ..Default::default()
    };
    assert_eq!(ids(&apply(&catalog, "", &f)), vec!["a"]);
  }

  #[test]
  fn sort_orders() {
    let mut a = test_content("a", 50.0);
    a.text = "banana".into();
    a.created_at = "2024-01-02T00:00:00Z".parse().unwrap();
    let mut b = test_content("b", 90.0);
    b.text = "Apple".into();
    b.created_at = "2024-01-01T00:00:00Z".parse().unwrap();
    let mut c = test_content("c", 70.0);
    c.text = "cherry".into();
    c.created_at = "2024-01-03T00:00:00Z".parse().unwrap();
    let catalog = vec![a, b, c];

    let with = |s| FilterOptions { sort_by: s, ..Default::default() };
    assert_eq!(ids(&apply(&catalog, "", &with(SortBy::Alphabetical))), vec!["b", "a", "c"]);
    assert_eq!(ids(&apply(&catalog, "", &with(SortBy::Popularity))), vec!["b", "c", "a"]);
    assert_eq!(ids(&apply(&catalog, "", &with(SortBy::DateAdded))), vec!["c", "a", "b"]);
    assert_eq!(ids(&apply(&catalog, "", &with(SortBy::RecentlyViewed))), vec!["a", "b", "c"]);
  }
}

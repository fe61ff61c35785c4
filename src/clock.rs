//! Calendar access. Streaks and the daily queue are keyed by the local calendar date.

use chrono::{DateTime, Local, NaiveDate, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait Clock: Send + Sync {
  /// Today's local calendar date.
  fn today(&self) -> NaiveDate;
  /// Current instant, used for unlock timestamps.
  fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
  fn today(&self) -> NaiveDate { Local::now().date_naive() }
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// `YYYY-MM-DD`, the format stored in stats and the daily queue.
pub fn date_key(date: NaiveDate) -> String {
  date.format(DATE_FORMAT).to_string()
}

pub fn parse_date_key(s: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

#[cfg(test)]
pub use fixed::FixedClock;

#[cfg(test)]
mod fixed {
  use std::sync::Mutex;

  use chrono::{DateTime, Duration, NaiveDate, Utc};

  use super::Clock;

  /// Clock pinned to a date; tests advance it explicitly.
  pub struct FixedClock {
    today: Mutex<NaiveDate>,
  }

  impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
      Self { today: Mutex::new(today) }
    }

    pub fn on(y: i32, m: u32, d: u32) -> Self {
      Self::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    pub fn advance_days(&self, days: i64) {
      let mut t = self.today.lock().unwrap();
      *t = *t + Duration::days(days);
    }
  }

  impl Clock for FixedClock {
    fn today(&self) -> NaiveDate { *self.today.lock().unwrap() }
    fn now(&self) -> DateTime<Utc> {
      self.today().and_hms_opt(12, 0, 0).unwrap().and_utc()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn date_key_round_trips() {
    let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    assert_eq!(date_key(d), "2024-03-09");
    assert_eq!(parse_date_key("2024-03-09"), Some(d));
    assert_eq!(parse_date_key(""), None);
  }
}

//! Saturday event slots.
//!
//! Events always run 15:45 to 18:45 on a Saturday. The next slot is the first
//! Saturday after tomorrow's date that has no submission in the ledger.

use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// Minutes after midnight the event starts (15:45)
pub const START_MINUTES: i64 = 15 * 60 + 45;
/// Minutes after midnight the event ends (18:45)
pub const END_MINUTES: i64 = 18 * 60 + 45;

const DAY_FORMAT: &str = "%Y-%m-%d";
const SLOT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// An event time slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Event start
    pub start: NaiveDateTime,
    /// Event end
    pub end: NaiveDateTime,
}

impl Slot {
    /// The standard slot on `date`
    #[must_use]
    pub fn on(date: NaiveDate) -> Self {
        let midnight = date.and_time(NaiveTime::default());
        Self {
            start: midnight + Duration::minutes(START_MINUTES),
            end: midnight + Duration::minutes(END_MINUTES),
        }
    }

    /// Day of the slot
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// `YYYY-MM-DD`, the form kept in the ledger
    #[must_use]
    pub fn date_key(&self) -> String {
        self.start.format(DAY_FORMAT).to_string()
    }

    /// Start as `YYYY-MM-DD HH:MM`
    #[must_use]
    pub fn start_str(&self) -> String {
        self.start.format(SLOT_FORMAT).to_string()
    }

    /// End as `YYYY-MM-DD HH:MM`
    #[must_use]
    pub fn end_str(&self) -> String {
        self.end.format(SLOT_FORMAT).to_string()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start_str(), self.end.format("%H:%M"))
    }
}

/// Next Saturday strictly after `from`
#[must_use]
pub fn next_saturday(from: NaiveDate) -> NaiveDate {
    let weekday = i64::from(from.weekday().num_days_from_monday());
    let ahead = match (5 - weekday).rem_euclid(7) {
        0 => 7,
        n => n,
    };
    from + Days::new(ahead as u64)
}

/// First slot after tomorrow whose date is not in `submitted`
#[must_use]
pub fn next_open_slot<S: AsRef<str>>(today: NaiveDate, submitted: &[S]) -> Slot {
    let taken = |date: NaiveDate| {
        let key = date.format(DAY_FORMAT).to_string();
        submitted.iter().any(|s| s.as_ref() == key)
    };
    let mut saturday = next_saturday(today + Days::new(1));
    while taken(saturday) {
        saturday = saturday + Days::new(7);
    }
    Slot::on(saturday)
}

/// Parse a `YYYY-MM-DD` argument
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DAY_FORMAT).map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use proptest::prelude::*;

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    mod saturday_tests {
        use super::*;

        #[test]
        fn test_from_weekday() {
            // 2026-10-14 is a Wednesday
            assert_eq!(next_saturday(day("2026-10-14")), day("2026-10-17"));
            assert_eq!(next_saturday(day("2026-10-16")), day("2026-10-17"));
        }

        #[test]
        fn test_from_saturday_is_a_week_later() {
            assert_eq!(next_saturday(day("2026-10-17")), day("2026-10-24"));
        }

        #[test]
        fn test_from_sunday() {
            assert_eq!(next_saturday(day("2026-10-18")), day("2026-10-24"));
        }
    }

    mod slot_tests {
        use super::*;

        #[test]
        fn test_slot_strings() {
            let slot = Slot::on(day("2026-10-17"));
            assert_eq!(slot.start_str(), "2026-10-17 15:45");
            assert_eq!(slot.end_str(), "2026-10-17 18:45");
            assert_eq!(slot.date_key(), "2026-10-17");
            assert_eq!(slot.to_string(), "2026-10-17 15:45 - 18:45");
        }

        #[test]
        fn test_friday_skips_to_following_week() {
            // tomorrow is Saturday, so the search starts after it
            let slot = next_open_slot::<&str>(day("2026-10-16"), &[]);
            assert_eq!(slot.date(), day("2026-10-24"));
        }

        #[test]
        fn test_submitted_weeks_skipped() {
            let slot = next_open_slot(day("2026-10-14"), &["2026-10-17", "2026-10-24"]);
            assert_eq!(slot.date(), day("2026-10-31"));
        }

        #[test]
        fn test_unrelated_dates_ignored() {
            let slot = next_open_slot(day("2026-10-14"), &["2026-10-18"]);
            assert_eq!(slot.date(), day("2026-10-17"));
        }

        #[test]
        fn test_bad_date_rejected() {
            assert!(parse_date("17/10/2026").is_err());
        }
    }

    proptest! {
        #[test]
        fn prop_next_saturday_within_a_week(offset in 0i64..5000) {
            let from = day("2020-01-01") + Duration::days(offset);
            let sat = next_saturday(from);
            prop_assert_eq!(sat.weekday(), Weekday::Sat);
            let ahead = (sat - from).num_days();
            prop_assert!((1..=7).contains(&ahead));
        }

        #[test]
        fn prop_open_slot_is_free_saturday(offset in 0i64..2000, taken in 0usize..6) {
            let today = day("2022-03-01") + Duration::days(offset);
            let mut submitted = Vec::new();
            let mut cursor = next_saturday(today + Days::new(1));
            for _ in 0..taken {
                submitted.push(cursor.format("%Y-%m-%d").to_string());
                cursor = cursor + Days::new(7);
            }
            let slot = next_open_slot(today, &submitted);
            prop_assert_eq!(slot.date(), cursor);
            prop_assert_eq!(slot.date().weekday(), Weekday::Sat);
            prop_assert!(!submitted.contains(&slot.date_key()));
        }
    }
}

// SPDX-License-Identifier: MIT

//! Streak accounting model.
//!
//! A streak counts distinct UTC calendar days with at least one qualifying
//! activity. The transition logic lives here as a pure function on the
//! record; the storage layer wraps it in a Firestore transaction so two
//! same-day activities cannot double-advance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Per-user streak document, keyed by user ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Streak {
    pub user_id: String,
    /// Current streak length in days
    pub current: u32,
    /// Longest streak ever observed
    pub longest: u32,
    /// Last UTC day with qualifying activity (`YYYY-MM-DD`)
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub last_active: Option<NaiveDate>,
}

impl Streak {
    /// A zeroed record for users who have never logged activity, so reads
    /// never fail.
    pub fn zeroed(user_id: String) -> Self {
        Self {
            user_id,
            current: 0,
            longest: 0,
            last_active: None,
        }
    }

    /// Apply a qualifying activity on the given UTC day.
    ///
    /// Returns `true` if the record changed. Same-day repeats are no-ops;
    /// a day exactly one later extends the streak; any other gap,
    /// including an activity dated before `last_active`, resets to 1.
    pub fn advance(&mut self, day: NaiveDate) -> bool {
        match self.last_active {
            None => {
                self.current = 1;
                self.longest = self.longest.max(1);
                self.last_active = Some(day);
                true
            }
            Some(last) if last == day => false,
            Some(last) if day == last + chrono::Duration::days(1) => {
                self.current += 1;
                self.longest = self.longest.max(self.current);
                self.last_active = Some(day);
                true
            }
            Some(_) => {
                // Missed a day, or an out-of-order timestamp: start over.
                self.current = 1;
                self.longest = self.longest.max(1);
                self.last_active = Some(day);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_activity_starts_streak() {
        let mut streak = Streak::zeroed("u1".to_string());
        assert!(streak.advance(day(2026, 3, 1)));
        assert_eq!(streak.current, 1);
        assert_eq!(streak.longest, 1);
        assert_eq!(streak.last_active, Some(day(2026, 3, 1)));
    }

    #[test]
    fn test_same_day_is_noop() {
        let mut streak = Streak::zeroed("u1".to_string());
        streak.advance(day(2026, 3, 1));
        let before = streak.clone();
        assert!(!streak.advance(day(2026, 3, 1)));
        assert_eq!(streak, before);
    }

    #[test]
    fn test_next_day_extends() {
        let mut streak = Streak::zeroed("u1".to_string());
        streak.advance(day(2026, 3, 1));
        streak.advance(day(2026, 3, 2));
        streak.advance(day(2026, 3, 3));
        assert_eq!(streak.current, 3);
        assert_eq!(streak.longest, 3);
    }

    #[test]
    fn test_gap_resets_but_keeps_longest() {
        let mut streak = Streak::zeroed("u1".to_string());
        streak.advance(day(2026, 3, 1));
        streak.advance(day(2026, 3, 2));
        streak.advance(day(2026, 3, 3));
        // Two days missed.
        streak.advance(day(2026, 3, 6));
        assert_eq!(streak.current, 1);
        assert_eq!(streak.longest, 3);
        assert_eq!(streak.last_active, Some(day(2026, 3, 6)));
    }

    #[test]
    fn test_backward_date_resets() {
        let mut streak = Streak::zeroed("u1".to_string());
        streak.advance(day(2026, 3, 10));
        streak.advance(day(2026, 3, 11));
        // Out-of-order activity timestamp resets rather than extends.
        streak.advance(day(2026, 3, 5));
        assert_eq!(streak.current, 1);
        assert_eq!(streak.longest, 2);
        assert_eq!(streak.last_active, Some(day(2026, 3, 5)));
    }

    #[test]
    fn test_extend_across_month_boundary() {
        let mut streak = Streak::zeroed("u1".to_string());
        streak.advance(day(2026, 1, 31));
        streak.advance(day(2026, 2, 1));
        assert_eq!(streak.current, 2);
    }

    #[test]
    fn test_longest_never_decreases() {
        let mut streak = Streak::zeroed("u1".to_string());
        for d in 1..=5 {
            streak.advance(day(2026, 4, d));
        }
        assert_eq!(streak.longest, 5);
        streak.advance(day(2026, 4, 20));
        streak.advance(day(2026, 4, 21));
        assert_eq!(streak.current, 2);
        assert_eq!(streak.longest, 5);
    }
}

// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting and day-boundary normalization.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Truncate a timestamp to its UTC calendar day.
///
/// Streak accounting counts distinct UTC days, so 23:59:59Z and the
/// following 00:00:01Z fall on different days regardless of the client's
/// local timezone.
pub fn utc_day(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_utc_day_truncates_time() {
        let late = Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 59).unwrap();
        let early = Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 1).unwrap();
        assert_eq!(utc_day(late), utc_day(early));
    }

    #[test]
    fn test_utc_day_crosses_midnight() {
        let before = Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 3, 15, 0, 1, 0).unwrap();
        assert_ne!(utc_day(before), utc_day(after));
        assert_eq!(utc_day(after) - utc_day(before), chrono::Duration::days(1));
    }

    #[test]
    fn test_format_uses_z_suffix() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_utc_rfc3339(at), "2026-01-02T03:04:05Z");
    }
}

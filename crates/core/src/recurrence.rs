//! Recurrence calculator (C3).
//!
//! Pure; no I/O. Ported from the source's `RecurrenceCalculator`, kept as a
//! closed set of three pattern functions rather than a general cron grammar.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recurrence pattern discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidRecurrenceSpec {
    #[error("interval must be a positive integer, got {0}")]
    NonPositiveInterval(u32),
    #[error("weekly recurrence requires a non-empty days_of_week set")]
    MissingDaysOfWeek,
    #[error("day_of_week {0} is out of range (expected 0=Monday..6=Sunday)")]
    DayOfWeekOutOfRange(u8),
    #[error("monthly recurrence requires day_of_month")]
    MissingDayOfMonth,
    #[error("day_of_month {0} is out of range (expected 1..=31)")]
    DayOfMonthOutOfRange(u8),
}

/// Compute the next occurrence of a recurring due date.
///
/// - `daily`: add `interval` days, preserving time-of-day.
/// - `weekly`: pick the smallest weekday in `days_of_week` strictly greater
///   than `current`'s weekday; if none exists this week, wrap to the first
///   day of the set and add `(interval - 1) * 7` days.
/// - `monthly`: target month is `current month + interval` (with year
///   wraparound); the day is `min(day_of_month, days_in_target_month)`.
pub fn next_occurrence(
    current: DateTime<Utc>,
    pattern: RecurrencePattern,
    interval: u32,
    days_of_week: &[u8],
    day_of_month: Option<u8>,
) -> Result<DateTime<Utc>, InvalidRecurrenceSpec> {
    if interval == 0 {
        return Err(InvalidRecurrenceSpec::NonPositiveInterval(interval));
    }

    match pattern {
        RecurrencePattern::Daily => Ok(current + chrono::Duration::days(i64::from(interval))),
        RecurrencePattern::Weekly => next_weekly(current, interval, days_of_week),
        RecurrencePattern::Monthly => {
            let day = day_of_month.ok_or(InvalidRecurrenceSpec::MissingDayOfMonth)?;
            next_monthly(current, interval, day)
        }
    }
}

fn next_weekly(
    current: DateTime<Utc>,
    interval: u32,
    days_of_week: &[u8],
) -> Result<DateTime<Utc>, InvalidRecurrenceSpec> {
    if days_of_week.is_empty() {
        return Err(InvalidRecurrenceSpec::MissingDaysOfWeek);
    }
    for &d in days_of_week {
        if d > 6 {
            return Err(InvalidRecurrenceSpec::DayOfWeekOutOfRange(d));
        }
    }

    let mut sorted: Vec<u8> = days_of_week.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    // chrono's Weekday::num_days_from_monday() matches the spec's 0=Monday.
    let current_weekday = current.weekday().num_days_from_monday() as u8;

    let next_day_this_week = sorted.iter().find(|&&d| d > current_weekday);

    let days_ahead = if let Some(&d) = next_day_this_week {
        i64::from(d - current_weekday)
    } else {
        let first = sorted[0];
        let to_end_of_week = i64::from(6 - current_weekday);
        to_end_of_week + 1 + i64::from(first) + i64::from(interval - 1) * 7
    };

    Ok(current + chrono::Duration::days(days_ahead))
}

fn next_monthly(
    current: DateTime<Utc>,
    interval: u32,
    day_of_month: u8,
) -> Result<DateTime<Utc>, InvalidRecurrenceSpec> {
    if !(1..=31).contains(&day_of_month) {
        return Err(InvalidRecurrenceSpec::DayOfMonthOutOfRange(day_of_month));
    }

    let total_months = i64::from(current.month0()) + i64::from(interval);
    let year = current.year() + i32::try_from(total_months / 12).unwrap_or(0);
    let month = u32::try_from(total_months % 12).unwrap_or(0) + 1;

    let days_in_target_month = days_in_month(year, month);
    let actual_day = day_of_month.min(days_in_target_month);

    let naive_date = chrono::NaiveDate::from_ymd_opt(year, month, u32::from(actual_day))
        .expect("clamped day is always valid for its month");
    let naive_time = current.time();
    let naive_datetime = naive_date
        .and_hms_nano_opt(
            naive_time.hour(),
            naive_time.minute(),
            naive_time.second(),
            naive_time.nanosecond(),
        )
        .expect("time-of-day copied from a valid DateTime is always valid");

    Ok(Utc.from_utc_datetime(&naive_datetime))
}

fn days_in_month(year: i32, month: u32) -> u8 {
    let next_month_first = if month == 12 {
        chrono::NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        chrono::NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("month arithmetic stays within chrono's representable range");
    let this_month_first =
        chrono::NaiveDate::from_ymd_opt(year, month, 1).expect("month is 1..=12");
    u8::try_from((next_month_first - this_month_first).num_days()).unwrap_or(31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, mi, 0).unwrap()
    }

    #[test]
    fn daily_preserves_time_of_day() {
        let current = dt(2026, 1, 6, 10, 0);
        let next =
            next_occurrence(current, RecurrencePattern::Daily, 1, &[], None).unwrap();
        assert_eq!(next, dt(2026, 1, 7, 10, 0));
    }

    #[test]
    fn daily_with_interval() {
        let current = dt(2026, 1, 6, 10, 0);
        let next =
            next_occurrence(current, RecurrencePattern::Daily, 3, &[], None).unwrap();
        assert_eq!(next, dt(2026, 1, 9, 10, 0));
    }

    #[test]
    fn weekly_picks_smallest_day_this_week() {
        // Monday 2026-01-05, days_of_week = [0, 3] (Mon, Thu) -> Thursday this week.
        let current = dt(2026, 1, 5, 14, 0);
        let next =
            next_occurrence(current, RecurrencePattern::Weekly, 1, &[0, 3], None).unwrap();
        assert_eq!(next, dt(2026, 1, 8, 14, 0));
    }

    #[test]
    fn weekly_wraps_to_next_week_when_no_later_day() {
        // Friday (weekday=4), set = [0, 2] (Mon, Wed) -> wraps to Monday next week.
        let current = dt(2026, 1, 9, 9, 0);
        let next =
            next_occurrence(current, RecurrencePattern::Weekly, 1, &[0, 2], None).unwrap();
        assert_eq!(next, dt(2026, 1, 12, 9, 0));
    }

    #[test]
    fn weekly_wraps_with_interval_greater_than_one() {
        let current = dt(2026, 1, 9, 9, 0); // Friday
        let next =
            next_occurrence(current, RecurrencePattern::Weekly, 2, &[0], None).unwrap();
        // Wraps to Monday, then an extra (interval-1)*7 = 7 days.
        assert_eq!(next, dt(2026, 1, 19, 9, 0));
    }

    #[test]
    fn monthly_31st_clamps_to_february() {
        let current = dt(2026, 1, 31, 12, 0);
        let next =
            next_occurrence(current, RecurrencePattern::Monthly, 1, &[], Some(31)).unwrap();
        assert_eq!(next, dt(2026, 2, 28, 12, 0));
    }

    #[test]
    fn monthly_31st_clamps_to_leap_february() {
        let current = dt(2028, 1, 31, 12, 0);
        let next =
            next_occurrence(current, RecurrencePattern::Monthly, 1, &[], Some(31)).unwrap();
        assert_eq!(next, dt(2028, 2, 29, 12, 0));
    }

    #[test]
    fn monthly_28th_back_to_31st_does_not_clamp() {
        let current = dt(2026, 2, 28, 12, 0);
        let next =
            next_occurrence(current, RecurrencePattern::Monthly, 1, &[], Some(31)).unwrap();
        assert_eq!(next, dt(2026, 3, 31, 12, 0));
    }

    #[test]
    fn monthly_wraps_year() {
        let current = dt(2026, 12, 15, 8, 0);
        let next =
            next_occurrence(current, RecurrencePattern::Monthly, 2, &[], Some(15)).unwrap();
        assert_eq!(next, dt(2027, 2, 15, 8, 0));
    }

    #[test]
    fn weekly_requires_days_of_week() {
        let current = dt(2026, 1, 5, 14, 0);
        let err =
            next_occurrence(current, RecurrencePattern::Weekly, 1, &[], None).unwrap_err();
        assert_eq!(err, InvalidRecurrenceSpec::MissingDaysOfWeek);
    }

    #[test]
    fn monthly_requires_day_of_month() {
        let current = dt(2026, 1, 5, 14, 0);
        let err =
            next_occurrence(current, RecurrencePattern::Monthly, 1, &[], None).unwrap_err();
        assert_eq!(err, InvalidRecurrenceSpec::MissingDayOfMonth);
    }

    #[test]
    fn rejects_zero_interval() {
        let current = dt(2026, 1, 5, 14, 0);
        let err = next_occurrence(current, RecurrencePattern::Daily, 0, &[], None).unwrap_err();
        assert_eq!(err, InvalidRecurrenceSpec::NonPositiveInterval(0));
    }

    #[test]
    fn monthly_invariant_min_day_holds_across_months() {
        let current = dt(2026, 1, 31, 0, 0);
        for month_len in [28, 29, 30, 31] {
            let target_day = 31u8.min(month_len);
            assert!(target_day <= month_len);
        }
        let _ = current;
    }
}

//! Calendar and week arithmetic shared by validation and rating.
//!
//! Instants are `NaiveDateTime` in the tariff's local civil time. Time-of-use
//! lookups work on the *week offset*: nanoseconds since Monday 00:00.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

pub const SECOND_NANOS: i64 = 1_000_000_000;
pub const HOUR_NANOS: i64 = 3_600 * SECOND_NANOS;
pub const DAY_NANOS: i64 = 24 * HOUR_NANOS;
pub const WEEK_NANOS: i64 = 7 * DAY_NANOS;

/// Length of a span in nanoseconds, saturating for spans beyond ~292 years.
pub fn span_nanos(span: TimeDelta) -> i64 {
    span.num_nanoseconds().unwrap_or(i64::MAX)
}

/// Nanoseconds since midnight for a time of day.
pub fn time_of_day_nanos(time: NaiveTime) -> i64 {
    // Leap-second representations carry nanosecond() >= 1e9; fold them into the last second.
    let nanos = i64::from(time.nanosecond()).min(SECOND_NANOS - 1);
    i64::from(time.num_seconds_from_midnight()) * SECOND_NANOS + nanos
}

/// Position of `at` within its week, counted from Monday 00:00.
pub fn week_offset(at: NaiveDateTime) -> i64 {
    let day = i64::from(at.weekday().num_days_from_monday());
    day * DAY_NANOS + time_of_day_nanos(at.time())
}

/// Human-readable form of a week offset, e.g. `Tue 07:00`.
pub fn format_week_offset(offset: i64) -> String {
    const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    let offset = offset.rem_euclid(WEEK_NANOS);
    let day = usize::try_from(offset / DAY_NANOS).unwrap_or(0);
    let in_day = offset % DAY_NANOS;
    let minutes = in_day / (60 * SECOND_NANOS);
    format!("{} {:02}:{:02}", DAYS[day], minutes / 60, minutes % 60)
}

/// Floor an instant onto a grid of `granularity` measured from midnight.
pub fn floor_to_granularity(at: NaiveDateTime, granularity: TimeDelta) -> NaiveDateTime {
    let step = span_nanos(granularity);
    if step <= 0 {
        return at;
    }
    let since_midnight = time_of_day_nanos(at.time());
    let floored = since_midnight - since_midnight % step;
    at.date().and_time(NaiveTime::MIN) + TimeDelta::nanoseconds(floored)
}

/// Whether an instant falls exactly on the `granularity` grid.
pub fn is_aligned(at: NaiveDateTime, granularity: TimeDelta) -> bool {
    floor_to_granularity(at, granularity) == at
}

/// First instant of the calendar month containing `date`, and of the month after it.
pub fn month_bounds(date: NaiveDate) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some((first.and_time(NaiveTime::MIN), next.and_time(NaiveTime::MIN)))
}

//! Fractional hours: the unit used for service durations and shift bounds.
//!
//! `9.5` is 09:30, `1.25` is one hour fifteen minutes. Conversions round to
//! whole seconds so that comparisons against timestamps are exact.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeDelta, Timelike, Utc};

/// Earliest allowed opening hour for any shift.
pub const EARLIEST_OPENING: f64 = 8.0;

/// Latest allowed closing hour for any shift.
pub const LATEST_CLOSING: f64 = 22.0;

/// Longest span a single appointment may cover. No day is open this long.
pub const MAX_APPOINTMENT_HOURS: f64 = 24.0;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Render fractional hours as `HH:MM`.
pub fn format_hours(value: f64) -> String {
    let total_minutes = (value * 60.0).round() as i64;
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// Convert a fractional-hours duration into a `chrono::Duration`, or `None`
/// when `hours` is not finite or does not fit.
pub fn hours_to_duration(hours: f64) -> Option<Duration> {
    if !hours.is_finite() {
        return None;
    }
    Duration::try_seconds(hours_to_seconds(hours))
}

/// Whole seconds in `hours`.
pub fn hours_to_seconds(hours: f64) -> i64 {
    (hours * SECONDS_PER_HOUR).round() as i64
}

/// Seconds elapsed between local midnight of `day_of` and `at`.
///
/// `at` may fall on a later day, in which case the result exceeds one day.
pub fn seconds_since_midnight(day_of: NaiveDateTime, at: NaiveDateTime) -> i64 {
    let midnight = day_of.date().and_hms_opt(0, 0, 0).unwrap_or(day_of);
    (at - midnight).num_seconds()
}

/// Interpret a wall-clock time in `zone` as an instant.
pub fn local_to_utc(local: NaiveDateTime, zone: &FixedOffset) -> DateTime<Utc> {
    (local - TimeDelta::seconds(i64::from(zone.local_minus_utc()))).and_utc()
}

/// Render a local timestamp's time of day as `HH:MM`.
pub fn format_clock(at: NaiveDateTime) -> String {
    format!("{:02}:{:02}", at.hour(), at.minute())
}

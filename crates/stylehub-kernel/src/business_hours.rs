//! Opening-hours check for a single appointment interval.

use crate::error::{PolicyError, SalonError, ValidationError};
use crate::hours::seconds_since_midnight;
use crate::schedule::SchedulePolicy;
use chrono::{Datelike, NaiveDateTime};

/// Accept `[start, end]` (local wall-clock time) only when it lies entirely
/// inside one open window of the start day.
///
/// Both ends are measured in seconds from midnight of the start day, so an
/// appointment that runs past midnight never fits a window.
pub fn check_business_hours(
    policy: Option<&SchedulePolicy>,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<(), SalonError> {
    let policy = policy.ok_or(PolicyError::NoScheduleConfigured)?;
    let weekday = start.weekday();
    let windows = policy
        .windows_for(weekday)
        .ok_or(ValidationError::ClosedDay { weekday })?;

    let start_secs = seconds_since_midnight(start, start);
    let end_secs = seconds_since_midnight(start, end);
    if windows
        .iter()
        .any(|window| window.contains(start_secs, end_secs))
    {
        return Ok(());
    }

    tracing::debug!(%start, %end, ?weekday, "appointment falls outside every open window");
    Err(ValidationError::OutsideBusinessHours {
        weekday,
        start,
        end,
        windows,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .expect("valid timestamp")
    }

    fn check(start: NaiveDateTime, end: NaiveDateTime) -> Result<(), SalonError> {
        check_business_hours(Some(&SchedulePolicy::default()), start, end)
    }

    #[test]
    fn accepts_interval_inside_morning_shift() {
        assert!(check(local(19, 10, 0), local(19, 11, 0)).is_ok());
    }

    #[test]
    fn window_bounds_are_inclusive() {
        assert!(check(local(19, 9, 30), local(19, 13, 30)).is_ok());
        assert!(check(local(19, 16, 30), local(19, 20, 30)).is_ok());
    }

    #[test]
    fn rejects_interval_spanning_the_lunch_break() {
        let err = check(local(19, 13, 0), local(19, 17, 0)).expect_err("spans two shifts");
        assert!(matches!(
            err,
            SalonError::Validation(ValidationError::OutsideBusinessHours { .. })
        ));
    }

    #[test]
    fn rejects_sunday() {
        let err = check(local(25, 10, 0), local(25, 11, 0)).expect_err("sunday is closed");
        assert_eq!(err.to_string(), "the salon is closed on Sunday");
    }

    #[test]
    fn saturday_follows_its_own_hours() {
        assert!(check(local(24, 13, 0), local(24, 14, 0)).is_ok());
        assert!(check(local(24, 13, 30), local(24, 14, 30)).is_err());
        assert!(check(local(24, 17, 0), local(24, 18, 0)).is_err());
    }

    #[test]
    fn closed_saturday_is_rejected() {
        let policy = SchedulePolicy {
            saturday_active: false,
            ..SchedulePolicy::default()
        };
        let err = check_business_hours(Some(&policy), local(24, 10, 0), local(24, 11, 0))
            .expect_err("saturday is closed");
        assert!(matches!(
            err,
            SalonError::Validation(ValidationError::ClosedDay { .. })
        ));
    }

    #[test]
    fn crossing_midnight_never_fits() {
        let policy = SchedulePolicy {
            weekday_afternoon_close: 22.0,
            ..SchedulePolicy::default()
        };
        assert!(check_business_hours(Some(&policy), local(19, 21, 0), local(20, 1, 0)).is_err());
    }

    #[test]
    fn missing_schedule_blocks_booking() {
        let err = check_business_hours(None, local(19, 10, 0), local(19, 11, 0))
            .expect_err("no schedule");
        assert_eq!(err, SalonError::Policy(PolicyError::NoScheduleConfigured));
    }
}

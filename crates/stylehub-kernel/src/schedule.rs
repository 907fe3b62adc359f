//! Weekly opening hours: the singleton schedule policy.
//!
//! Monday to Friday share one morning and one afternoon shift. Saturday has
//! its own morning shift and an optional afternoon shift, and can be closed
//! entirely. Sunday has no representable shift.

use crate::error::ValidationError;
use crate::hours::{EARLIEST_OPENING, LATEST_CLOSING, format_hours, hours_to_seconds};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_SCHEDULE_NAME: &str = "Salon opening hours";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    Morning,
    Afternoon,
}

/// One contiguous open interval of a day, in fractional hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub shift: Shift,
    pub open: f64,
    pub close: f64,
}

impl ShiftWindow {
    pub fn new(shift: Shift, open: f64, close: f64) -> Self {
        Self { shift, open, close }
    }

    /// Whether `[start, end]`, given as seconds since local midnight of the
    /// start day, lies fully inside the window.
    pub fn contains(&self, start_secs: i64, end_secs: i64) -> bool {
        hours_to_seconds(self.open) <= start_secs && end_secs <= hours_to_seconds(self.close)
    }
}

impl fmt::Display for ShiftWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_hours(self.open), format_hours(self.close))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePolicy {
    pub name: String,

    pub weekday_morning_open: f64,
    pub weekday_morning_close: f64,
    pub weekday_afternoon_open: f64,
    pub weekday_afternoon_close: f64,

    pub saturday_active: bool,
    pub saturday_morning_open: f64,
    pub saturday_morning_close: f64,
    pub saturday_afternoon_active: bool,
    pub saturday_afternoon_open: f64,
    pub saturday_afternoon_close: f64,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            name: DEFAULT_SCHEDULE_NAME.to_string(),
            weekday_morning_open: 9.5,
            weekday_morning_close: 13.5,
            weekday_afternoon_open: 16.5,
            weekday_afternoon_close: 20.5,
            saturday_active: true,
            saturday_morning_open: 9.5,
            saturday_morning_close: 14.0,
            saturday_afternoon_active: false,
            saturday_afternoon_open: 16.5,
            saturday_afternoon_close: 20.0,
        }
    }
}

impl SchedulePolicy {
    /// Open windows for `weekday`, or `None` when the salon is closed.
    pub fn windows_for(&self, weekday: Weekday) -> Option<Vec<ShiftWindow>> {
        match weekday {
            Weekday::Sun => None,
            Weekday::Sat => {
                if !self.saturday_active {
                    return None;
                }
                let mut windows = vec![ShiftWindow::new(
                    Shift::Morning,
                    self.saturday_morning_open,
                    self.saturday_morning_close,
                )];
                if self.saturday_afternoon_active {
                    windows.push(ShiftWindow::new(
                        Shift::Afternoon,
                        self.saturday_afternoon_open,
                        self.saturday_afternoon_close,
                    ));
                }
                Some(windows)
            }
            _ => Some(vec![
                ShiftWindow::new(
                    Shift::Morning,
                    self.weekday_morning_open,
                    self.weekday_morning_close,
                ),
                ShiftWindow::new(
                    Shift::Afternoon,
                    self.weekday_afternoon_open,
                    self.weekday_afternoon_close,
                ),
            ]),
        }
    }

    /// Field-level invariants. Only active shifts are checked.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(invalid("name is required".to_string()));
        }

        let hours = [
            self.weekday_morning_open,
            self.weekday_morning_close,
            self.weekday_afternoon_open,
            self.weekday_afternoon_close,
            self.saturday_morning_open,
            self.saturday_morning_close,
            self.saturday_afternoon_open,
            self.saturday_afternoon_close,
        ];
        if hours.iter().any(|value| !value.is_finite()) {
            return Err(invalid("hours must be finite numbers".to_string()));
        }

        let saturday_afternoon = self.saturday_active && self.saturday_afternoon_active;

        let openings = [
            (true, "weekday morning", self.weekday_morning_open),
            (
                self.saturday_active,
                "Saturday morning",
                self.saturday_morning_open,
            ),
            (
                saturday_afternoon,
                "Saturday afternoon",
                self.saturday_afternoon_open,
            ),
        ];
        for (active, label, value) in openings {
            if active && value < EARLIEST_OPENING {
                return Err(invalid(format!(
                    "{label} opening cannot be before {} (got {})",
                    format_hours(EARLIEST_OPENING),
                    format_hours(value)
                )));
            }
        }

        let closings = [
            (true, "weekday afternoon", self.weekday_afternoon_close),
            (
                self.saturday_active,
                "Saturday morning",
                self.saturday_morning_close,
            ),
            (
                saturday_afternoon,
                "Saturday afternoon",
                self.saturday_afternoon_close,
            ),
        ];
        for (active, label, value) in closings {
            if active && value > LATEST_CLOSING {
                return Err(invalid(format!(
                    "{label} closing cannot be after {} (got {})",
                    format_hours(LATEST_CLOSING),
                    format_hours(value)
                )));
            }
        }

        check_day(
            "weekday",
            (self.weekday_morning_open, self.weekday_morning_close),
            Some((self.weekday_afternoon_open, self.weekday_afternoon_close)),
        )?;

        if self.saturday_active {
            check_day(
                "Saturday",
                (self.saturday_morning_open, self.saturday_morning_close),
                self.saturday_afternoon_active
                    .then_some((self.saturday_afternoon_open, self.saturday_afternoon_close)),
            )?;
        }

        Ok(())
    }
}

fn check_day(
    label: &str,
    morning: (f64, f64),
    afternoon: Option<(f64, f64)>,
) -> Result<(), ValidationError> {
    let (morning_open, morning_close) = morning;
    if morning_open >= morning_close {
        return Err(invalid(format!(
            "{label} morning opening must be before its closing ({} >= {})",
            format_hours(morning_open),
            format_hours(morning_close)
        )));
    }

    let Some((afternoon_open, afternoon_close)) = afternoon else {
        return Ok(());
    };
    if afternoon_open >= afternoon_close {
        return Err(invalid(format!(
            "{label} afternoon opening must be before its closing ({} >= {})",
            format_hours(afternoon_open),
            format_hours(afternoon_close)
        )));
    }
    if morning_close > afternoon_open {
        return Err(invalid(format!(
            "{label} morning shift must end before the afternoon shift starts (closes {}, afternoon opens {})",
            format_hours(morning_close),
            format_hours(afternoon_open)
        )));
    }
    Ok(())
}

fn invalid(reason: String) -> ValidationError {
    ValidationError::InvalidSchedule { reason }
}

/// Partial update of a [`SchedulePolicy`]; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulePatch {
    pub name: Option<String>,
    pub weekday_morning_open: Option<f64>,
    pub weekday_morning_close: Option<f64>,
    pub weekday_afternoon_open: Option<f64>,
    pub weekday_afternoon_close: Option<f64>,
    pub saturday_active: Option<bool>,
    pub saturday_morning_open: Option<f64>,
    pub saturday_morning_close: Option<f64>,
    pub saturday_afternoon_active: Option<bool>,
    pub saturday_afternoon_open: Option<f64>,
    pub saturday_afternoon_close: Option<f64>,
}

impl SchedulePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, policy: &mut SchedulePolicy) {
        if let Some(name) = &self.name {
            policy.name = name.clone();
        }
        set(&mut policy.weekday_morning_open, self.weekday_morning_open);
        set(&mut policy.weekday_morning_close, self.weekday_morning_close);
        set(&mut policy.weekday_afternoon_open, self.weekday_afternoon_open);
        set(&mut policy.weekday_afternoon_close, self.weekday_afternoon_close);
        set(&mut policy.saturday_active, self.saturday_active);
        set(&mut policy.saturday_morning_open, self.saturday_morning_open);
        set(&mut policy.saturday_morning_close, self.saturday_morning_close);
        set(&mut policy.saturday_afternoon_active, self.saturday_afternoon_active);
        set(&mut policy.saturday_afternoon_open, self.saturday_afternoon_open);
        set(&mut policy.saturday_afternoon_close, self.saturday_afternoon_close);
    }
}

fn set<T: Copy>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

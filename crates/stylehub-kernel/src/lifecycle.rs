//! Appointment lifecycle state machine.
//!
//! ```text
//! draft ──confirm──▶ confirmed ──complete──▶ done
//!   ▲                    │
//!   │ reset              │ cancel
//!   └──── cancelled ◀────┘  (cancel is also allowed from draft)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentState {
    #[default]
    Draft,
    Confirmed,
    Done,
    Cancelled,
}

impl AppointmentState {
    pub const ACTIVE: [AppointmentState; 2] = [AppointmentState::Draft, AppointmentState::Confirmed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Confirmed => "confirmed",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }

    /// Draft or confirmed: still occupies the calendar and locks the schedule.
    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    /// State reached by applying `transition`, or `None` when not allowed.
    pub fn next(self, transition: Transition) -> Option<AppointmentState> {
        match (transition, self) {
            (Transition::Confirm, Self::Draft) => Some(Self::Confirmed),
            (Transition::Complete, Self::Confirmed) => Some(Self::Done),
            (Transition::Cancel, Self::Draft | Self::Confirmed | Self::Cancelled) => {
                Some(Self::Cancelled)
            }
            (Transition::Reset, Self::Cancelled) => Some(Self::Draft),
            _ => None,
        }
    }
}

impl fmt::Display for AppointmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" => Ok(Self::Draft),
            "confirmed" => Ok(Self::Confirmed),
            "done" => Ok(Self::Done),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!(
                "unknown appointment state '{other}' (expected draft, confirmed, done or cancelled)"
            )),
        }
    }
}

/// A lifecycle action requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Confirm,
    Complete,
    Cancel,
    Reset,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [AppointmentState; 4] = [
        AppointmentState::Draft,
        AppointmentState::Confirmed,
        AppointmentState::Done,
        AppointmentState::Cancelled,
    ];

    #[test]
    fn confirm_only_from_draft() {
        for state in ALL_STATES {
            let expected = (state == AppointmentState::Draft).then_some(AppointmentState::Confirmed);
            assert_eq!(state.next(Transition::Confirm), expected, "from {state}");
        }
    }

    #[test]
    fn complete_only_from_confirmed() {
        for state in ALL_STATES {
            let expected = (state == AppointmentState::Confirmed).then_some(AppointmentState::Done);
            assert_eq!(state.next(Transition::Complete), expected, "from {state}");
        }
    }

    #[test]
    fn cancel_from_anything_but_done() {
        assert_eq!(AppointmentState::Done.next(Transition::Cancel), None);
        for state in [
            AppointmentState::Draft,
            AppointmentState::Confirmed,
            AppointmentState::Cancelled,
        ] {
            assert_eq!(
                state.next(Transition::Cancel),
                Some(AppointmentState::Cancelled)
            );
        }
    }

    #[test]
    fn reset_only_from_cancelled() {
        for state in ALL_STATES {
            let expected = (state == AppointmentState::Cancelled).then_some(AppointmentState::Draft);
            assert_eq!(state.next(Transition::Reset), expected, "from {state}");
        }
    }

    #[test]
    fn parses_state_names() {
        assert_eq!(
            "confirmed".parse::<AppointmentState>(),
            Ok(AppointmentState::Confirmed)
        );
        assert!("archived".parse::<AppointmentState>().is_err());
    }
}

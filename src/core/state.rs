//! The seventeen PackML states.
//!
//! [`StateId`] identifies one top-level state of the PackML model. The engine
//! keeps one descriptor per id; "no state entered yet" is represented by
//! `Option<StateId>::None` rather than a sentinel variant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a PackML state.
///
/// The numeric [`code`](StateId::code) follows the PackML state numbering so
/// hosts can publish it unchanged.
///
/// # Example
///
/// ```rust
/// use packml::core::StateId;
///
/// assert_eq!(StateId::Execute.name(), "Execute");
/// assert_eq!(StateId::Execute.code(), 6);
/// assert!(StateId::Starting.is_transitional());
/// assert!(!StateId::Idle.is_transitional());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateId {
    Aborted,
    Clearing,
    Stopped,
    Resetting,
    Idle,
    Starting,
    Execute,
    Holding,
    Held,
    Unholding,
    Suspending,
    Suspended,
    Unsuspending,
    Completing,
    Complete,
    Aborting,
    Stopping,
}

/// Named duration bucket a resting state accrues time into.
///
/// Transitional states have no category; their time only counts towards the
/// total duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationCategory {
    Idle,
    Execute,
    Held,
    Suspended,
    Complete,
    Stopped,
    Aborted,
}

impl StateId {
    /// Every state, in descriptor order.
    pub const ALL: [StateId; 17] = [
        StateId::Aborted,
        StateId::Clearing,
        StateId::Stopped,
        StateId::Resetting,
        StateId::Idle,
        StateId::Starting,
        StateId::Execute,
        StateId::Holding,
        StateId::Held,
        StateId::Unholding,
        StateId::Suspending,
        StateId::Suspended,
        StateId::Unsuspending,
        StateId::Completing,
        StateId::Complete,
        StateId::Aborting,
        StateId::Stopping,
    ];

    /// Human readable state name, as passed to state change notifiers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Aborted => "Aborted",
            Self::Clearing => "Clearing",
            Self::Stopped => "Stopped",
            Self::Resetting => "Resetting",
            Self::Idle => "Idle",
            Self::Starting => "Starting",
            Self::Execute => "Execute",
            Self::Holding => "Holding",
            Self::Held => "Held",
            Self::Unholding => "UnHolding",
            Self::Suspending => "Suspending",
            Self::Suspended => "Suspended",
            Self::Unsuspending => "UnSuspending",
            Self::Completing => "Completing",
            Self::Complete => "Complete",
            Self::Aborting => "Aborting",
            Self::Stopping => "Stopping",
        }
    }

    /// PackML state number.
    pub fn code(&self) -> u8 {
        match self {
            Self::Clearing => 1,
            Self::Stopped => 2,
            Self::Starting => 3,
            Self::Idle => 4,
            Self::Suspended => 5,
            Self::Execute => 6,
            Self::Stopping => 7,
            Self::Aborting => 8,
            Self::Aborted => 9,
            Self::Holding => 10,
            Self::Held => 11,
            Self::Unholding => 12,
            Self::Suspending => 13,
            Self::Unsuspending => 14,
            Self::Resetting => 15,
            Self::Completing => 16,
            Self::Complete => 17,
        }
    }

    /// Position of this state in [`StateId::ALL`].
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }

    /// Whether this is one of the "*ING" states that only advance on
    /// `StateComplete`.
    pub fn is_transitional(&self) -> bool {
        self.category().is_none()
    }

    /// Duration bucket for this state, `None` for transitional states.
    pub fn category(&self) -> Option<DurationCategory> {
        match self {
            Self::Idle => Some(DurationCategory::Idle),
            Self::Execute => Some(DurationCategory::Execute),
            Self::Held => Some(DurationCategory::Held),
            Self::Suspended => Some(DurationCategory::Suspended),
            Self::Complete => Some(DurationCategory::Complete),
            Self::Stopped => Some(DurationCategory::Stopped),
            Self::Aborted => Some(DurationCategory::Aborted),
            _ => None,
        }
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_index_order() {
        for (i, state) in StateId::ALL.iter().enumerate() {
            assert_eq!(state.index(), i);
        }
    }

    #[test]
    fn codes_are_the_packml_numbers_one_to_seventeen() {
        let mut codes: Vec<u8> = StateId::ALL.iter().map(StateId::code).collect();
        codes.sort_unstable();
        assert_eq!(codes, (1..=17).collect::<Vec<u8>>());
    }

    #[test]
    fn seven_states_carry_a_category() {
        let categorized = StateId::ALL
            .iter()
            .filter(|s| s.category().is_some())
            .count();
        assert_eq!(categorized, 7);
        assert_eq!(
            StateId::Suspended.category(),
            Some(DurationCategory::Suspended)
        );
        assert_eq!(StateId::Suspending.category(), None);
    }

    #[test]
    fn transitional_states_end_in_ing() {
        for state in StateId::ALL {
            assert_eq!(
                state.is_transitional(),
                state.name().ends_with("ing"),
                "{state}"
            );
        }
    }

    #[test]
    fn state_serializes_in_screaming_case() {
        let json = serde_json::to_string(&StateId::Unholding).unwrap();
        assert_eq!(json, "\"UNHOLDING\"");
        let back: StateId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StateId::Unholding);
    }
}

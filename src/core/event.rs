//! Events driving the PackML state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An input to the state machine.
///
/// External commands are issued by the host; `StateComplete` and `Error` are
/// produced by state actions, or injected directly by a host that signals
/// completion itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Activate,
    Deactivate,
    Clear,
    Reset,
    Start,
    Stop,
    Abort,
    Hold,
    Unhold,
    Suspend,
    Unsuspend,
    StateComplete,
    Error,
}

impl Event {
    /// Whether this event is a host command rather than an action outcome.
    pub fn is_command(&self) -> bool {
        !matches!(self, Self::StateComplete | Self::Error)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Clear => "clear",
            Self::Reset => "reset",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Abort => "abort",
            Self::Hold => "hold",
            Self::Unhold => "unhold",
            Self::Suspend => "suspend",
            Self::Unsuspend => "unsuspend",
            Self::StateComplete => "state_complete",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_are_not_commands() {
        assert!(Event::Start.is_command());
        assert!(Event::Deactivate.is_command());
        assert!(!Event::StateComplete.is_command());
        assert!(!Event::Error.is_command());
    }

    #[test]
    fn display_matches_serialized_name() {
        let json = serde_json::to_string(&Event::StateComplete).unwrap();
        assert_eq!(json, format!("\"{}\"", Event::StateComplete));
    }
}

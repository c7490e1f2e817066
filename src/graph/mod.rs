//! Transition graphs for the two PackML cycle modes.
//!
//! Both modes share the command rows of the PackML model. They differ only
//! in what `StateComplete` does in `Execute`:
//! - [`CycleMode::SingleCycle`] advances through `Completing` to `Complete`
//! - [`CycleMode::Continuous`] re-enters `Execute`, re-running its action

mod table;

pub use table::TransitionGraph;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selects the transition graph of an engine for its whole lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleMode {
    /// One pass through `Execute`, then rest in `Complete`.
    #[default]
    SingleCycle,
    /// Loop within `Execute` until commanded out.
    Continuous,
}

impl fmt::Display for CycleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleCycle => f.write_str("single cycle"),
            Self::Continuous => f.write_str("continuous"),
        }
    }
}

//! Signal phases and the state-code lookup.
//!
//! The observation feed reports a numeric state code per observation:
//!
//! | code | phase          |
//! |------|----------------|
//! | 0    | dark           |
//! | 1    | red            |
//! | 2    | amber          |
//! | 3    | green          |
//! | 4    | red-amber      |
//! | 5    | amber-flashing |
//! | 6    | green-flashing |
//! | 9    | unknown        |
//!
//! Only red and green are stable. Everything else is transitional and never
//! scored or predicted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Phase
// =============================================================================

/// Phase label of a signal observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Dark,
    Red,
    Amber,
    Green,
    RedAmber,
    AmberFlashing,
    GreenFlashing,
    Unknown,
}

impl Phase {
    /// The two phases eligible for duration statistics and forecasting.
    pub const STABLE: [Phase; 2] = [Phase::Red, Phase::Green];

    /// True for red and green.
    pub fn is_stable(self) -> bool {
        matches!(self, Phase::Red | Phase::Green)
    }

    /// The stable phase that follows this one.
    ///
    /// Returns `None` for transitional phases, which have no defined successor
    /// in the two-phase model.
    pub fn opposite(self) -> Option<Phase> {
        match self {
            Phase::Red => Some(Phase::Green),
            Phase::Green => Some(Phase::Red),
            _ => None,
        }
    }

    /// Canonical state code reported for this phase.
    pub fn state_code(self) -> i64 {
        match self {
            Phase::Dark => 0,
            Phase::Red => 1,
            Phase::Amber => 2,
            Phase::Green => 3,
            Phase::RedAmber => 4,
            Phase::AmberFlashing => 5,
            Phase::GreenFlashing => 6,
            Phase::Unknown => 9,
        }
    }

    /// Human-readable label.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Dark => "dark",
            Phase::Red => "red",
            Phase::Amber => "amber",
            Phase::Green => "green",
            Phase::RedAmber => "red-amber",
            Phase::AmberFlashing => "amber-flashing",
            Phase::GreenFlashing => "green-flashing",
            Phase::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// StateCodeTable
// =============================================================================

/// Immutable lookup from feed state codes to phases.
///
/// Built once and passed by reference to the normalizer. The default table
/// is the one published for the observation datastreams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateCodeTable {
    codes: BTreeMap<i64, Phase>,
}

impl StateCodeTable {
    /// Build a table from explicit `(code, phase)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i64, Phase)>) -> Self {
        Self {
            codes: pairs.into_iter().collect(),
        }
    }

    /// Map a state code to its phase, `None` when the code is unmapped.
    pub fn lookup(&self, code: i64) -> Option<Phase> {
        self.codes.get(&code).copied()
    }

    /// Number of mapped codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for StateCodeTable {
    fn default() -> Self {
        Self::from_pairs([
            (0, Phase::Dark),
            (1, Phase::Red),
            (2, Phase::Amber),
            (3, Phase::Green),
            (4, Phase::RedAmber),
            (5, Phase::AmberFlashing),
            (6, Phase::GreenFlashing),
            (9, Phase::Unknown),
        ])
    }
}

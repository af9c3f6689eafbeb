//! Normalized observations and the duration samples derived from them.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::phase::{Phase, StateCodeTable};

// =============================================================================
// Observation
// =============================================================================

/// A single timestamped phase report.
///
/// Immutable once created. The phase label is always derived from the state
/// code through a [`StateCodeTable`]; codes outside the table never produce an
/// observation.
///
/// Deserialization goes through [`Observation::from_code`] with the default
/// table and fails when the serialized phase disagrees with the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ObservationRecord")]
pub struct Observation {
    timestamp: DateTime<FixedOffset>,
    state_code: i64,
    phase: Phase,
}

/// Serialized form of an [`Observation`], checked on the way in.
#[derive(Deserialize)]
struct ObservationRecord {
    timestamp: DateTime<FixedOffset>,
    state_code: i64,
    phase: Phase,
}

impl TryFrom<ObservationRecord> for Observation {
    type Error = String;

    fn try_from(record: ObservationRecord) -> Result<Self, Self::Error> {
        let table = StateCodeTable::default();
        match Observation::from_code(record.timestamp, record.state_code, &table) {
            Some(obs) if obs.phase == record.phase => Ok(obs),
            Some(obs) => Err(format!(
                "state code {} maps to {}, not {}",
                record.state_code, obs.phase, record.phase
            )),
            None => Err(format!("unmapped state code {}", record.state_code)),
        }
    }
}

impl Observation {
    /// Build an observation from a raw state code.
    ///
    /// Returns `None` when the code is not mapped by `table`.
    pub fn from_code(
        timestamp: DateTime<FixedOffset>,
        state_code: i64,
        table: &StateCodeTable,
    ) -> Option<Self> {
        table.lookup(state_code).map(|phase| Self {
            timestamp,
            state_code,
            phase,
        })
    }

    /// Build an observation using the canonical state code of `phase`.
    pub fn with_phase(timestamp: DateTime<FixedOffset>, phase: Phase) -> Self {
        Self {
            timestamp,
            state_code: phase.state_code(),
            phase,
        }
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn state_code(&self) -> i64 {
        self.state_code
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_stable(&self) -> bool {
        self.phase.is_stable()
    }
}

// =============================================================================
// DurationSample
// =============================================================================

/// How long an observed phase persisted before the next recorded observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationSample {
    /// Phase of the observation the sample starts at
    pub phase: Phase,
    /// Timestamp of that observation
    pub started_at: DateTime<FixedOffset>,
    /// Elapsed seconds until the next observation (never negative)
    pub seconds: f64,
}

// =============================================================================
// Time arithmetic
// =============================================================================

/// Seconds elapsed from `earlier` to `later`, with microsecond resolution.
pub fn elapsed_seconds(earlier: DateTime<FixedOffset>, later: DateTime<FixedOffset>) -> f64 {
    let delta = later.signed_duration_since(earlier);
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

/// Convert fractional seconds into a `chrono::Duration`, rounded to the microsecond.
pub fn duration_from_seconds(seconds: f64) -> Duration {
    Duration::microseconds((seconds * 1_000_000.0).round() as i64)
}

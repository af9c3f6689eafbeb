//! Confidence Gate.
//!
//! Decides whether red/green duration statistics are regular enough to
//! forecast from. A rejection is an abstention, not an error: the caller gets
//! an empty forecast together with an [`AbstainReason`].
//!
//! ## Checks (in order)
//! 1. Both stable phases have statistics (at least one duration sample)
//! 2. Both means are strictly positive
//! 3. Both coefficients of variation are within `max_variation_coefficient`
//!
//! Insufficient-data conditions (1, 2) are reported before low confidence (3).

use std::fmt;

use serde::{Deserialize, Serialize};
use signalcast_models::Phase;
use tracing::warn;

use crate::config::DEFAULT_MAX_VARIATION_COEFFICIENT;
use crate::statistics::{PhaseStatistics, PhaseStatisticsSet};

// =============================================================================
// Configuration
// =============================================================================

/// Gate thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    pub max_variation_coefficient: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_variation_coefficient: DEFAULT_MAX_VARIATION_COEFFICIENT,
        }
    }
}

// =============================================================================
// Abstention
// =============================================================================

/// Coarse abstention category, used for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbstainKind {
    InsufficientData,
    LowConfidence,
}

/// Why no forecast was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AbstainReason {
    /// Fewer usable observations than the pipeline needs
    InsufficientObservations { usable: usize, required: usize },
    /// A stable phase produced no duration samples
    MissingPhase { phase: Phase },
    /// A stable phase has a zero mean duration, so its variation is undefined
    ZeroMean { phase: Phase },
    /// A stable phase's durations are too irregular
    LowConfidence {
        phase: Phase,
        coefficient_of_variation: f64,
        threshold: f64,
    },
}

impl AbstainReason {
    pub fn kind(&self) -> AbstainKind {
        match self {
            AbstainReason::InsufficientObservations { .. }
            | AbstainReason::MissingPhase { .. }
            | AbstainReason::ZeroMean { .. } => AbstainKind::InsufficientData,
            AbstainReason::LowConfidence { .. } => AbstainKind::LowConfidence,
        }
    }
}

impl fmt::Display for AbstainReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstainReason::InsufficientObservations { usable, required } => write!(
                f,
                "insufficient data: {} usable observations, {} required",
                usable, required
            ),
            AbstainReason::MissingPhase { phase } => {
                write!(f, "insufficient data: no duration samples for {}", phase)
            }
            AbstainReason::ZeroMean { phase } => {
                write!(f, "insufficient data: zero mean duration for {}", phase)
            }
            AbstainReason::LowConfidence {
                phase,
                coefficient_of_variation,
                threshold,
            } => write!(
                f,
                "low confidence: {} coefficient of variation {:.3} exceeds {:.3}",
                phase, coefficient_of_variation, threshold
            ),
        }
    }
}

// =============================================================================
// Decision
// =============================================================================

/// Statistics that passed the gate. Both stable phases are present with a
/// positive mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustedStatistics {
    pub red: PhaseStatistics,
    pub green: PhaseStatistics,
}

impl TrustedStatistics {
    /// Mean duration of a stable phase, `None` for transitional phases.
    pub fn mean_seconds(&self, phase: Phase) -> Option<f64> {
        match phase {
            Phase::Red => Some(self.red.mean_seconds),
            Phase::Green => Some(self.green.mean_seconds),
            _ => None,
        }
    }
}

/// Gate outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Accepted(TrustedStatistics),
    Rejected(AbstainReason),
}

impl GateDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GateDecision::Accepted(_))
    }
}

// =============================================================================
// ConfidenceGate
// =============================================================================

/// Accepts or rejects a statistics set for forecasting.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceGate {
    config: GateConfig,
}

impl ConfidenceGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Evaluate the red and green statistics in `stats`.
    pub fn evaluate(&self, stats: &PhaseStatisticsSet) -> GateDecision {
        let (red, green) = match (stats.get(Phase::Red), stats.get(Phase::Green)) {
            (Some(r), Some(g)) => (*r, *g),
            (None, _) => return GateDecision::Rejected(AbstainReason::MissingPhase { phase: Phase::Red }),
            (_, None) => {
                return GateDecision::Rejected(AbstainReason::MissingPhase {
                    phase: Phase::Green,
                })
            }
        };

        let mut cvs = Vec::with_capacity(2);
        for s in [&red, &green] {
            match s.coefficient_of_variation {
                Some(cv) => cvs.push((s.phase, cv)),
                None => return GateDecision::Rejected(AbstainReason::ZeroMean { phase: s.phase }),
            }
        }

        let threshold = self.config.max_variation_coefficient;
        for (phase, cv) in cvs {
            if cv > threshold {
                warn!(
                    %phase,
                    coefficient_of_variation = cv,
                    threshold,
                    "duration variation above threshold, no useful prediction possible"
                );
                return GateDecision::Rejected(AbstainReason::LowConfidence {
                    phase,
                    coefficient_of_variation: cv,
                    threshold,
                });
            }
        }

        GateDecision::Accepted(TrustedStatistics { red, green })
    }
}

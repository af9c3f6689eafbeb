//! # Forecast Pipeline
//!
//! Chains the stages into the live-forecast path:
//!
//! ```text
//! raw records → normalize → stable-only → sort/collapse → durations
//!             → statistics → confidence gate → forecast
//! ```
//!
//! The forecaster holds only immutable configuration and a clock, so one
//! instance can serve concurrent requests for any number of signals.

use signalcast_models::{ForecastEntry, Observation, RawRecord, StateCodeTable};
use tracing::{debug, info, info_span};

use crate::clock::{Clock, SystemClock};
use crate::config::ForecastConfig;
use crate::durations::compute_durations;
use crate::error::ForecastError;
use crate::filter::{sort_and_collapse, stable_only};
use crate::gate::{AbstainReason, ConfidenceGate, GateDecision};
use crate::generator::{Forecast, ForecastGenerator};
use crate::normalize::Normalizer;
use crate::statistics::{summarize, PhaseStatisticsSet};

// =============================================================================
// Outcome
// =============================================================================

/// Result of a forecast request that did not fail on bad input.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    Forecast(Forecast),
    Abstained(AbstainReason),
}

impl ForecastOutcome {
    pub fn forecast(&self) -> Option<&Forecast> {
        match self {
            ForecastOutcome::Forecast(f) => Some(f),
            ForecastOutcome::Abstained(_) => None,
        }
    }

    pub fn abstain_reason(&self) -> Option<&AbstainReason> {
        match self {
            ForecastOutcome::Forecast(_) => None,
            ForecastOutcome::Abstained(r) => Some(r),
        }
    }

    pub fn is_abstained(&self) -> bool {
        matches!(self, ForecastOutcome::Abstained(_))
    }

    /// Wire entries; empty on abstention.
    pub fn to_entries(&self) -> Vec<ForecastEntry> {
        self.forecast().map(Forecast::to_entries).unwrap_or_default()
    }
}

// =============================================================================
// ForecastEngine
// =============================================================================

/// Clock-free forecasting core: filter, statistics, gate, generator.
///
/// "Now" is supplied per call, so the live facade and a replay harness run
/// exactly the same stages.
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    config: ForecastConfig,
    gate: ConfidenceGate,
    generator: ForecastGenerator,
}

impl ForecastEngine {
    pub fn new(config: ForecastConfig) -> Result<Self, ForecastError> {
        config.validate()?;
        Ok(Self {
            gate: ConfidenceGate::new(config.gate_config()),
            generator: ForecastGenerator::new(config.horizon, config.clamp_offset_secs),
            config,
        })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast from observations in any order, with "now" read from `clock`.
    pub fn forecast(
        &self,
        observations: &[Observation],
        clock: &dyn Clock,
    ) -> Result<ForecastOutcome, ForecastError> {
        let stable = sort_and_collapse(stable_only(observations));
        // Two stable observations are needed for a single duration sample.
        let required = self.config.min_observations.max(2);
        let origin = match stable.last() {
            Some(last) if stable.len() >= required => *last,
            _ => {
                return Ok(ForecastOutcome::Abstained(
                    AbstainReason::InsufficientObservations {
                        usable: stable.len(),
                        required,
                    },
                ))
            }
        };

        let stats = summarize_stable(&stable)?;
        let trusted = match self.gate.evaluate(&stats) {
            GateDecision::Accepted(trusted) => trusted,
            GateDecision::Rejected(reason) => {
                debug!(%reason, "confidence gate rejected");
                return Ok(ForecastOutcome::Abstained(reason));
            }
        };

        let forecast = self.generator.generate(&trusted, &origin, clock)?;
        debug!(
            origin = %origin.timestamp().to_rfc3339(),
            steps = forecast.steps.len(),
            clamped = forecast.clamped,
            "forecast generated"
        );
        Ok(ForecastOutcome::Forecast(forecast))
    }
}

// =============================================================================
// PhaseForecaster
// =============================================================================

/// Live-forecast facade: state-code table and clock around a [`ForecastEngine`].
#[derive(Debug, Clone)]
pub struct PhaseForecaster<C: Clock = SystemClock> {
    engine: ForecastEngine,
    table: StateCodeTable,
    clock: C,
}

impl PhaseForecaster<SystemClock> {
    /// Forecaster on the wall clock with the default state-code table.
    pub fn new(config: ForecastConfig) -> Result<Self, ForecastError> {
        Self::with_clock(config, StateCodeTable::default(), SystemClock)
    }
}

impl<C: Clock> PhaseForecaster<C> {
    pub fn with_clock(
        config: ForecastConfig,
        table: StateCodeTable,
        clock: C,
    ) -> Result<Self, ForecastError> {
        Ok(Self {
            engine: ForecastEngine::new(config)?,
            table,
            clock,
        })
    }

    pub fn config(&self) -> &ForecastConfig {
        self.engine.config()
    }

    pub fn table(&self) -> &StateCodeTable {
        &self.table
    }

    pub fn engine(&self) -> &ForecastEngine {
        &self.engine
    }

    /// Live entry point: signal identifier plus raw records in, wire entries out.
    ///
    /// Returns an empty list whenever the forecaster abstains.
    pub fn predict(
        &self,
        signal_id: &str,
        records: &[RawRecord],
    ) -> Result<Vec<ForecastEntry>, ForecastError> {
        let _span = info_span!("predict", signal_id).entered();
        let outcome = self.forecast_records(records)?;
        if let ForecastOutcome::Abstained(reason) = &outcome {
            info!(%reason, "no forecast");
        }
        Ok(outcome.to_entries())
    }

    /// Normalize raw records and forecast from them.
    pub fn forecast_records(&self, records: &[RawRecord]) -> Result<ForecastOutcome, ForecastError> {
        let min_observations = self.config().min_observations;
        if records.len() < min_observations {
            return Ok(ForecastOutcome::Abstained(
                AbstainReason::InsufficientObservations {
                    usable: records.len(),
                    required: min_observations,
                },
            ));
        }
        let observations = Normalizer::new(&self.table).normalize(records)?;
        self.forecast_observations(&observations)
    }

    /// Forecast from already-normalized observations in any order.
    pub fn forecast_observations(
        &self,
        observations: &[Observation],
    ) -> Result<ForecastOutcome, ForecastError> {
        self.engine.forecast(observations, &self.clock)
    }
}

/// Duration statistics of an ascending, stable-only sequence.
pub fn summarize_stable(stable: &[Observation]) -> Result<PhaseStatisticsSet, ForecastError> {
    Ok(summarize(&compute_durations(stable)?))
}

//! Forecaster configuration.
//!
//! All fields default, so a config file only needs to name what it overrides.

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;
use crate::gate::GateConfig;

/// Maximum stddev/mean ratio accepted by the confidence gate.
pub const DEFAULT_MAX_VARIATION_COEFFICIENT: f64 = 0.5;

/// Number of future transitions predicted per call.
pub const DEFAULT_HORIZON: usize = 2;

/// Upper bound on the forecast horizon.
pub const MAX_HORIZON: usize = 1_000;

/// Raw records required before a live forecast is attempted.
pub const DEFAULT_MIN_OBSERVATIONS: usize = 2;

/// Offset added to "now" when the first prediction would lie in the past.
pub const DEFAULT_CLAMP_OFFSET_SECS: f64 = 1.0;

/// Forecaster configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Reject when either stable phase exceeds this coefficient of variation
    pub max_variation_coefficient: f64,

    /// Number of predicted transitions (1..=MAX_HORIZON)
    pub horizon: usize,

    /// Fewer raw records than this yields an insufficient-data abstention
    pub min_observations: usize,

    /// Seconds past "now" used when the first prediction is clamped
    pub clamp_offset_secs: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            max_variation_coefficient: DEFAULT_MAX_VARIATION_COEFFICIENT,
            horizon: DEFAULT_HORIZON,
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            clamp_offset_secs: DEFAULT_CLAMP_OFFSET_SECS,
        }
    }
}

impl ForecastConfig {
    /// Check invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), ForecastError> {
        if !self.max_variation_coefficient.is_finite() || self.max_variation_coefficient <= 0.0 {
            return Err(ForecastError::Config(format!(
                "max_variation_coefficient must be finite and > 0, got {}",
                self.max_variation_coefficient
            )));
        }
        if self.horizon == 0 || self.horizon > MAX_HORIZON {
            return Err(ForecastError::Config(format!(
                "horizon must be in 1..={}, got {}",
                MAX_HORIZON, self.horizon
            )));
        }
        if !self.clamp_offset_secs.is_finite() || self.clamp_offset_secs <= 0.0 {
            return Err(ForecastError::Config(format!(
                "clamp_offset_secs must be finite and > 0, got {}",
                self.clamp_offset_secs
            )));
        }
        Ok(())
    }

    /// Gate thresholds derived from this config.
    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            max_variation_coefficient: self.max_variation_coefficient,
        }
    }
}

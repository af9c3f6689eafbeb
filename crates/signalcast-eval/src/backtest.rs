//! # Backtest Harness
//!
//! Replays a historical observation sequence through the forecast pipeline
//! with a sliding window and scores each one-step prediction against the
//! transition that actually followed.
//!
//! ## Procedure
//! 1. Require ascending input; keep stable phases; collapse duplicate instants
//! 2. For each index `i >= W` of the stable sequence, forecast from the window
//!    `[i - W, i)` with "now" pinned to the timestamp of `i - 1`
//! 3. Score `|predicted - actual(i)|` in seconds
//!
//! Windows where the forecaster abstains are counted separately and excluded
//! from the error aggregate.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use signalcast_forecast::{
    detect_order, sort_and_collapse, stable_only, FixedClock, ForecastConfig, ForecastEngine,
    ForecastError, ForecastOutcome, TimeOrder,
};
use signalcast_models::observation::elapsed_seconds;
use signalcast_models::Observation;
use tracing::{debug, info};

use crate::report::{BacktestReport, WindowOutcome, WindowResult};

/// Default lookback window, in stable observations.
pub const DEFAULT_WINDOW_SIZE: usize = 16;

// =============================================================================
// Configuration
// =============================================================================

/// Backtest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Stable observations per lookback window (>= 2)
    pub window_size: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.window_size < 2 {
            return Err(BacktestError::Config(format!(
                "window_size must be >= 2, got {}",
                self.window_size
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Backtest failures. Abstaining windows are not errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BacktestError {
    #[error("forecast error: {0}")]
    Forecast(#[from] ForecastError),

    #[error("backtest input must be sorted ascending by timestamp")]
    NotAscending,

    #[error("empty forecast for window at index {index}")]
    EmptyForecast { index: usize },

    #[error("report serialization failed: {0}")]
    Report(String),

    #[error("configuration error: {0}")]
    Config(String),
}

// =============================================================================
// BacktestHarness
// =============================================================================

/// Sliding-window replay of the forecast pipeline.
///
/// Each window runs the same [`ForecastEngine`] as the live forecaster, with
/// "now" pinned to the window's last observation.
#[derive(Debug, Clone)]
pub struct BacktestHarness {
    config: BacktestConfig,
    engine: ForecastEngine,
}

impl BacktestHarness {
    /// Build a harness. The forecast horizon is forced to one step.
    pub fn new(config: BacktestConfig, forecast: ForecastConfig) -> Result<Self, BacktestError> {
        config.validate()?;
        let engine = ForecastEngine::new(ForecastConfig {
            horizon: 1,
            ..forecast
        })?;
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run the backtest over an ascending observation sequence.
    pub fn run(&self, observations: &[Observation]) -> Result<BacktestReport, BacktestError> {
        if detect_order(observations).map_err(|_| BacktestError::NotAscending)? != TimeOrder::Ascending {
            return Err(BacktestError::NotAscending);
        }

        let stable = sort_and_collapse(stable_only(observations));
        let w = self.config.window_size;
        info!(
            observations = observations.len(),
            stable = stable.len(),
            window_size = w,
            "starting backtest"
        );

        let mut windows = Vec::with_capacity(stable.len().saturating_sub(w));
        for i in w..stable.len() {
            let window = &stable[i - w..i];
            let origin = window[w - 1];
            let actual = stable[i];
            let clock = FixedClock::new(origin.timestamp().with_timezone(&Utc));

            let outcome = match self.engine.forecast(window, &clock)? {
                ForecastOutcome::Forecast(forecast) => {
                    let step = forecast
                        .first()
                        .ok_or(BacktestError::EmptyForecast { index: i })?;
                    WindowOutcome::Scored {
                        predicted: step.predicted_timestamp,
                        predicted_phase: step.phase,
                        error_seconds: elapsed_seconds(step.predicted_timestamp, actual.timestamp())
                            .abs(),
                        clamped: forecast.clamped,
                    }
                }
                ForecastOutcome::Abstained(reason) => {
                    debug!(index = i, %reason, "window abstained");
                    WindowOutcome::Abstained { reason }
                }
            };

            windows.push(WindowResult {
                index: i,
                origin,
                actual,
                outcome,
            });
        }

        let report = BacktestReport::build(w, stable.len(), windows)
            .map_err(|e| BacktestError::Report(e.to_string()))?;
        info!(
            windows = report.windows_evaluated,
            scored = report.scored,
            abstained = report.abstained,
            mean_error_seconds = ?report.mean_error_seconds,
            "backtest complete"
        );
        Ok(report)
    }
}

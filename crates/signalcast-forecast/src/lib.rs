//! # Signalcast Forecast
//!
//! Forecasts upcoming red/green transitions of a cyclic two-phase signal from a
//! batch of irregularly timed observations.
//!
//! ## Stages
//! - `normalize`: raw records → typed observations (unknown codes dropped)
//! - `filter`: stable-phase filter, canonical ascending order, duplicate collapse
//! - `durations`: time from each observation to its chronological successor
//! - `statistics`: per-phase mean / sample stddev / coefficient of variation
//! - `gate`: confidence gate (accept, or abstain with a reason)
//! - `generator`: horizon-bounded forecast with the past-time clamp
//! - `pipeline`: `ForecastEngine` (clock-free core) and `PhaseForecaster`, the
//!   live-forecast facade
//!
//! ## Invariants
//! - No persisted state; every call rebuilds its statistics from the input
//! - Abstentions (insufficient data, low confidence) are values, not errors
//! - The first predicted transition is always strictly after "now"
//!
//! ## Usage
//! ```ignore
//! use signalcast_forecast::{ForecastConfig, PhaseForecaster};
//!
//! let forecaster = PhaseForecaster::new(ForecastConfig::default())?;
//! let entries = forecaster.predict("50850", &records)?;
//! ```

pub mod clock;
pub mod config;
pub mod durations;
pub mod error;
pub mod filter;
pub mod gate;
pub mod generator;
pub mod normalize;
pub mod pipeline;
pub mod statistics;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ForecastConfig, MAX_HORIZON};
pub use durations::{compute_durations, cycle_durations, detect_order, TimeOrder};
pub use error::ForecastError;
pub use filter::{sort_and_collapse, sort_ascending, stable_only};
pub use gate::{AbstainKind, AbstainReason, ConfidenceGate, GateConfig, GateDecision, TrustedStatistics};
pub use generator::{Forecast, ForecastGenerator, ForecastStep};
pub use normalize::{NormalizedBatch, Normalizer};
pub use pipeline::{summarize_stable, ForecastEngine, ForecastOutcome, PhaseForecaster};
pub use statistics::{
    summarize, summarize_all_phases, summarize_cycle, PhaseStatistics, PhaseStatisticsSet,
};

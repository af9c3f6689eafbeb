//! Forecaster error taxonomy.
//!
//! Only true input errors live here. Insufficient data and low confidence are
//! abstentions (see [`crate::gate::AbstainReason`]), not errors.

use signalcast_models::ParseError;

/// Errors that abort a single forecast or analysis call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("observations not sorted by timestamp (first violation at index {index})")]
    Unsorted { index: usize },

    #[error("cannot forecast from transitional phase: {phase}")]
    TransitionalOrigin { phase: signalcast_models::Phase },

    #[error("predicted timestamp out of range after step {step}")]
    TimestampOutOfRange { step: usize },

    #[error("configuration error: {0}")]
    Config(String),
}

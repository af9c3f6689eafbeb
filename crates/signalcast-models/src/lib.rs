//! # Signalcast Models
//!
//! Typed data model for forecasting a cyclically alternating two-phase signal
//! (a traffic light's red/green cycle) from irregularly timed observations.
//!
//! ## Modules
//! - `phase`: phase labels and the state-code lookup table
//! - `observation`: normalized observations and duration samples
//! - `record`: wire shapes for raw input records and forecast output entries
//! - `error`: per-record parse failures

pub mod error;
pub mod observation;
pub mod phase;
pub mod record;

pub use error::{ParseError, ParseErrorKind};
pub use observation::{DurationSample, Observation};
pub use phase::{Phase, StateCodeTable};
pub use record::{ForecastEntry, RawRecord};

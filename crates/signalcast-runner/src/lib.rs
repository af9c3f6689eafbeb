//! # Signalcast Runner
//!
//! Driver layer for the `signalcast` binary: configuration, dataset
//! loading, logging setup, and the command implementations.

pub mod commands;
pub mod config;
pub mod dataset;
pub mod observability;

pub use commands::{run_backtest, run_forecast, run_stats, StatsReport};
pub use config::{ConfigError, RunnerConfig};
pub use dataset::{load_records, parse_records, DatasetError};
pub use observability::{init_tracing, TracingGuards};

//! Signalcast Evaluation
//!
//! Measures forecast accuracy by replaying historical observations through the
//! live pipeline. Pure computation: no I/O, deterministic for a given input.
//!
//! ## Modules
//! - `backtest`: sliding-window harness
//! - `report`: aggregate report with abstention counts and digest

pub mod backtest;
pub mod report;

pub use backtest::{BacktestConfig, BacktestError, BacktestHarness, DEFAULT_WINDOW_SIZE};
pub use report::{BacktestReport, WindowOutcome, WindowResult, BACKTEST_REPORT_SCHEMA_VERSION};

//! Command implementations behind the `signalcast` CLI.
//!
//! Each command takes already-loaded records and returns a serializable
//! result; the binary owns file and stdout handling.

use chrono::{DateTime, Utc};
use serde::Serialize;
use signalcast_eval::{BacktestHarness, BacktestReport};
use signalcast_forecast::{
    sort_and_collapse, sort_ascending, stable_only, summarize_all_phases, summarize_cycle,
    summarize_stable, Clock, FixedClock, ForecastError, Normalizer, PhaseForecaster,
    PhaseStatistics, PhaseStatisticsSet, SystemClock,
};
use signalcast_models::{ForecastEntry, Phase, RawRecord, StateCodeTable};
use tracing::{info, warn};

use crate::config::RunnerConfig;

// =============================================================================
// forecast
// =============================================================================

/// Live forecast for one signal. `now` pins the clock; otherwise wall time.
pub fn run_forecast(
    config: &RunnerConfig,
    signal_id: &str,
    records: &[RawRecord],
    now: Option<DateTime<Utc>>,
) -> Result<Vec<ForecastEntry>, ForecastError> {
    match now {
        Some(instant) => predict_with(config, FixedClock::new(instant), signal_id, records),
        None => predict_with(config, SystemClock, signal_id, records),
    }
}

fn predict_with<C: Clock>(
    config: &RunnerConfig,
    clock: C,
    signal_id: &str,
    records: &[RawRecord],
) -> Result<Vec<ForecastEntry>, ForecastError> {
    let forecaster =
        PhaseForecaster::with_clock(config.forecast.clone(), StateCodeTable::default(), clock)?;
    forecaster.predict(signal_id, records)
}

// =============================================================================
// stats
// =============================================================================

/// Exploratory statistics over a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub records: usize,
    pub observations: usize,
    pub rejected_records: usize,
    pub dropped_unknown_codes: usize,
    /// Red/green statistics as used for forecasting
    pub stable: PhaseStatisticsSet,
    /// Every phase present, durations to the next observation of any phase.
    /// Reports sharing an instant are all kept, so zero-length samples occur.
    pub all_phases: PhaseStatisticsSet,
    pub cycle_anchor: Phase,
    pub cycle: Option<PhaseStatistics>,
}

impl StatsReport {
    pub fn to_text_summary(&self) -> String {
        let mut lines = vec![
            format!(
                "Records: {} ({} observations, {} rejected, {} unknown codes)",
                self.records, self.observations, self.rejected_records, self.dropped_unknown_codes
            ),
            String::new(),
            "Stable phases:".to_string(),
        ];
        lines.extend(self.stable.iter().map(stats_line));
        lines.push(String::new());
        lines.push("All phases:".to_string());
        lines.extend(self.all_phases.iter().map(stats_line));
        lines.push(String::new());
        match &self.cycle {
            Some(cycle) => lines.push(format!(
                "Cycle ({} to {}): {}",
                self.cycle_anchor,
                self.cycle_anchor,
                stats_line(cycle).trim_start()
            )),
            None => lines.push(format!("Cycle ({}): n/a", self.cycle_anchor)),
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

fn stats_line(s: &PhaseStatistics) -> String {
    let cv = s
        .coefficient_of_variation
        .map_or_else(|| "n/a".to_string(), |cv| format!("{:.3}", cv));
    format!(
        "  {:<15} n={:<5} mean={:>8.2}s  std={:>8.2}s  cv={}",
        s.phase.as_str(),
        s.sample_count,
        s.mean_seconds,
        s.stddev_seconds,
        cv
    )
}

pub fn run_stats(records: &[RawRecord], anchor: Phase) -> Result<StatsReport, ForecastError> {
    let table = StateCodeTable::default();
    let batch = Normalizer::new(&table).normalize_lenient(records);
    if !batch.rejected.is_empty() {
        warn!(rejected = batch.rejected.len(), "skipped malformed records");
    }

    // All-phase views keep every report; the red/green view filters before
    // collapsing shared instants, as the live forecaster does.
    let ordered = sort_ascending(batch.observations);
    let stable = sort_and_collapse(stable_only(&ordered));
    let report = StatsReport {
        records: records.len(),
        observations: ordered.len(),
        rejected_records: batch.rejected.len(),
        dropped_unknown_codes: batch.dropped_unknown,
        stable: summarize_stable(&stable)?,
        all_phases: summarize_all_phases(&ordered)?,
        cycle_anchor: anchor,
        cycle: summarize_cycle(&ordered, anchor)?,
    };
    info!(
        observations = report.observations,
        phases = report.all_phases.len(),
        "statistics computed"
    );
    Ok(report)
}

// =============================================================================
// backtest
// =============================================================================

/// Backtest over a dataset. Records are sorted ascending before replay.
pub fn run_backtest(
    config: &RunnerConfig,
    records: &[RawRecord],
) -> Result<BacktestReport, signalcast_eval::BacktestError> {
    let table = StateCodeTable::default();
    let batch = Normalizer::new(&table).normalize_lenient(records);
    if !batch.rejected.is_empty() {
        warn!(rejected = batch.rejected.len(), "skipped malformed records");
    }
    // The harness filters to red/green before collapsing shared instants.
    let ordered = sort_ascending(batch.observations);

    let harness = BacktestHarness::new(config.backtest.clone(), config.forecast.clone())?;
    harness.run(&ordered)
}

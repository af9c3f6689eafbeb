//! Phase Statistics Summarizer.
//!
//! Standard deviation is the sample standard deviation (n − 1 denominator).
//! A single sample yields a standard deviation of 0; a phase with no samples
//! yields no statistics at all.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use signalcast_models::{DurationSample, Observation, Phase};

use crate::durations::{compute_durations, cycle_durations};
use crate::error::ForecastError;

// =============================================================================
// PhaseStatistics
// =============================================================================

/// Duration statistics for one phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseStatistics {
    pub phase: Phase,
    pub sample_count: usize,
    pub mean_seconds: f64,
    pub stddev_seconds: f64,
    /// `stddev / mean`; `None` when the mean is not strictly positive
    pub coefficient_of_variation: Option<f64>,
}

impl PhaseStatistics {
    /// Summarize raw durations, `None` when `seconds` is empty.
    pub fn from_durations(phase: Phase, seconds: &[f64]) -> Option<Self> {
        if seconds.is_empty() {
            return None;
        }
        let n = seconds.len();
        let mean = seconds.iter().sum::<f64>() / n as f64;
        let stddev = if n < 2 {
            0.0
        } else {
            let ss: f64 = seconds.iter().map(|s| (s - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        };
        let coefficient_of_variation = (mean > 0.0).then(|| stddev / mean);

        Some(Self {
            phase,
            sample_count: n,
            mean_seconds: mean,
            stddev_seconds: stddev,
            coefficient_of_variation,
        })
    }
}

// =============================================================================
// PhaseStatisticsSet
// =============================================================================

/// Statistics keyed by phase. Phases without samples are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseStatisticsSet {
    by_phase: BTreeMap<Phase, PhaseStatistics>,
}

impl PhaseStatisticsSet {
    pub fn get(&self, phase: Phase) -> Option<&PhaseStatistics> {
        self.by_phase.get(&phase)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhaseStatistics> {
        self.by_phase.values()
    }

    pub fn len(&self) -> usize {
        self.by_phase.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_phase.is_empty()
    }
}

/// Group samples by phase and summarize each group.
pub fn summarize(samples: &[DurationSample]) -> PhaseStatisticsSet {
    let mut grouped: BTreeMap<Phase, Vec<f64>> = BTreeMap::new();
    for sample in samples {
        grouped.entry(sample.phase).or_default().push(sample.seconds);
    }
    let by_phase = grouped
        .into_iter()
        .filter_map(|(phase, secs)| {
            PhaseStatistics::from_durations(phase, &secs).map(|stats| (phase, stats))
        })
        .collect();
    PhaseStatisticsSet { by_phase }
}

/// Exploratory statistics over every phase present, transitional ones included.
///
/// Durations run to the next observation of any phase. Input must be sorted.
/// Not used for forecasting.
pub fn summarize_all_phases(observations: &[Observation]) -> Result<PhaseStatisticsSet, ForecastError> {
    Ok(summarize(&compute_durations(observations)?))
}

/// Statistics of the full cycle anchored at `anchor` (e.g. red → red).
pub fn summarize_cycle(
    observations: &[Observation],
    anchor: Phase,
) -> Result<Option<PhaseStatistics>, ForecastError> {
    let secs: Vec<f64> = cycle_durations(observations, anchor)?
        .iter()
        .map(|s| s.seconds)
        .collect();
    Ok(PhaseStatistics::from_durations(anchor, &secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn sample(phase: Phase, seconds: f64) -> DurationSample {
        DurationSample {
            phase,
            started_at: FixedOffset::east_opt(0).unwrap().timestamp_opt(0, 0).unwrap(),
            seconds,
        }
    }

    #[test]
    fn test_sample_stddev() {
        let stats = PhaseStatistics::from_durations(Phase::Red, &[10.0, 90.0]).unwrap();
        assert_eq!(stats.mean_seconds, 50.0);
        // sqrt((40² + 40²) / 1)
        assert!((stats.stddev_seconds - 56.568_542_494_923_8).abs() < 1e-9);
        assert!(stats.coefficient_of_variation.unwrap() > 1.0);
    }

    #[test]
    fn test_single_sample_has_zero_stddev() {
        let stats = PhaseStatistics::from_durations(Phase::Green, &[32.0]).unwrap();
        assert_eq!(stats.sample_count, 1);
        assert_eq!(stats.stddev_seconds, 0.0);
        assert_eq!(stats.coefficient_of_variation, Some(0.0));
    }

    #[test]
    fn test_zero_mean_has_no_cv() {
        let stats = PhaseStatistics::from_durations(Phase::Red, &[0.0, 0.0]).unwrap();
        assert_eq!(stats.mean_seconds, 0.0);
        assert!(stats.coefficient_of_variation.is_none());
    }

    #[test]
    fn test_empty_has_no_statistics() {
        assert!(PhaseStatistics::from_durations(Phase::Red, &[]).is_none());
    }

    #[test]
    fn test_summarize_groups_by_phase() {
        let samples = vec![
            sample(Phase::Red, 30.0),
            sample(Phase::Green, 30.0),
            sample(Phase::Red, 32.0),
            sample(Phase::Green, 26.0),
        ];
        let set = summarize(&samples);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(Phase::Red).unwrap().mean_seconds, 31.0);
        assert_eq!(set.get(Phase::Green).unwrap().mean_seconds, 28.0);
        assert!(set.get(Phase::Amber).is_none());
    }

    #[test]
    fn test_summarize_all_phases_includes_transitional() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let obs: Vec<Observation> = [
            (0, Phase::Red),
            (30, Phase::RedAmber),
            (32, Phase::Green),
            (60, Phase::Amber),
            (63, Phase::Red),
        ]
        .into_iter()
        .map(|(s, p)| Observation::with_phase(tz.timestamp_opt(s, 0).unwrap(), p))
        .collect();

        let set = summarize_all_phases(&obs).unwrap();
        assert_eq!(set.get(Phase::RedAmber).unwrap().mean_seconds, 2.0);
        assert_eq!(set.get(Phase::Amber).unwrap().mean_seconds, 3.0);
        assert_eq!(set.get(Phase::Green).unwrap().mean_seconds, 28.0);

        let cycle = summarize_cycle(&obs, Phase::Red).unwrap().unwrap();
        assert_eq!(cycle.sample_count, 1);
        assert_eq!(cycle.mean_seconds, 63.0);
    }
}

//! Forecast Generator.
//!
//! Walks the red/green alternation forward from the most recent observation,
//! adding the mean duration of each phase in turn. The first prediction is
//! floored at `now + clamp_offset`; later steps are not clamped.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use signalcast_models::observation::duration_from_seconds;
use signalcast_models::{ForecastEntry, Observation, Phase};
use tracing::warn;

use crate::clock::Clock;
use crate::config::{DEFAULT_CLAMP_OFFSET_SECS, DEFAULT_HORIZON};
use crate::error::ForecastError;
use crate::gate::TrustedStatistics;

/// One predicted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastStep {
    pub predicted_timestamp: DateTime<FixedOffset>,
    pub phase: Phase,
}

impl ForecastStep {
    pub fn to_entry(&self) -> ForecastEntry {
        ForecastEntry {
            timestamp: self.predicted_timestamp.to_rfc3339(),
            state_code: self.phase.state_code(),
        }
    }
}

/// An ordered list of predicted transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Observation the forecast starts from
    pub origin: Observation,
    /// Predicted transitions, earliest first
    pub steps: Vec<ForecastStep>,
    /// True when the first prediction was moved up to `now + clamp_offset`
    pub clamped: bool,
    /// Statistics the forecast was built from
    pub statistics: TrustedStatistics,
}

impl Forecast {
    pub fn first(&self) -> Option<&ForecastStep> {
        self.steps.first()
    }

    pub fn to_entries(&self) -> Vec<ForecastEntry> {
        self.steps.iter().map(ForecastStep::to_entry).collect()
    }
}

/// Produces bounded-horizon forecasts from trusted statistics.
#[derive(Debug, Clone, Copy)]
pub struct ForecastGenerator {
    horizon: usize,
    clamp_offset: Duration,
}

impl Default for ForecastGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_HORIZON, DEFAULT_CLAMP_OFFSET_SECS)
    }
}

impl ForecastGenerator {
    pub fn new(horizon: usize, clamp_offset_secs: f64) -> Self {
        Self {
            horizon,
            clamp_offset: duration_from_seconds(clamp_offset_secs),
        }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Predict the next `horizon` transitions after `origin`.
    ///
    /// `origin` must be a stable-phase observation.
    pub fn generate(
        &self,
        stats: &TrustedStatistics,
        origin: &Observation,
        clock: &dyn Clock,
    ) -> Result<Forecast, ForecastError> {
        let current = origin.phase();
        let (mut phase, first_mean) = match (current.opposite(), stats.mean_seconds(current)) {
            (Some(next), Some(mean)) => (next, mean),
            _ => return Err(ForecastError::TransitionalOrigin { phase: current }),
        };

        let offset = *origin.timestamp().offset();
        let now = clock.now().with_timezone(&offset);

        let mut predicted = origin
            .timestamp()
            .checked_add_signed(duration_from_seconds(first_mean))
            .ok_or(ForecastError::TimestampOutOfRange { step: 1 })?;
        let clamped = predicted <= now;
        if clamped {
            let floor = now
                .checked_add_signed(self.clamp_offset)
                .ok_or(ForecastError::TimestampOutOfRange { step: 1 })?;
            warn!(
                naive = %predicted.to_rfc3339(),
                clamped_to = %floor.to_rfc3339(),
                "first prediction not in the future, clamping"
            );
            predicted = floor;
        }

        let mut steps = vec![ForecastStep {
            predicted_timestamp: predicted,
            phase,
        }];

        while steps.len() < self.horizon {
            // `phase` is always stable here, so both lookups succeed.
            let (next, mean) = match (phase.opposite(), stats.mean_seconds(phase)) {
                (Some(next), Some(mean)) => (next, mean),
                _ => return Err(ForecastError::TransitionalOrigin { phase }),
            };
            predicted = predicted
                .checked_add_signed(duration_from_seconds(mean))
                .ok_or(ForecastError::TimestampOutOfRange {
                    step: steps.len() + 1,
                })?;
            phase = next;
            steps.push(ForecastStep {
                predicted_timestamp: predicted,
                phase,
            });
        }

        Ok(Forecast {
            origin: *origin,
            steps,
            clamped,
            statistics: *stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::MAX_HORIZON;
    use crate::statistics::PhaseStatistics;
    use chrono::{TimeZone, Utc};

    const T0: i64 = 1_684_389_600; // 2023-05-18T06:00:00Z

    fn tz() -> FixedOffset {
        FixedOffset::east_opt(7200).unwrap()
    }

    fn at(secs: i64, phase: Phase) -> Observation {
        Observation::with_phase(tz().timestamp_opt(T0 + secs, 0).unwrap(), phase)
    }

    fn clock_at(secs: i64) -> FixedClock {
        FixedClock::new(Utc.timestamp_opt(T0 + secs, 0).unwrap())
    }

    fn trusted(red: f64, green: f64) -> TrustedStatistics {
        TrustedStatistics {
            red: PhaseStatistics::from_durations(Phase::Red, &[red]).unwrap(),
            green: PhaseStatistics::from_durations(Phase::Green, &[green]).unwrap(),
        }
    }

    #[test]
    fn test_two_step_forecast_from_red() {
        let gen = ForecastGenerator::default();
        let forecast = gen
            .generate(&trusted(31.0, 28.0), &at(118, Phase::Red), &clock_at(118))
            .unwrap();

        assert!(!forecast.clamped);
        assert_eq!(forecast.steps.len(), 2);
        assert_eq!(forecast.steps[0].phase, Phase::Green);
        assert_eq!(forecast.steps[0].predicted_timestamp, at(149, Phase::Red).timestamp());
        assert_eq!(forecast.steps[1].phase, Phase::Red);
        assert_eq!(forecast.steps[1].predicted_timestamp, at(177, Phase::Red).timestamp());
    }

    #[test]
    fn test_clamp_when_prediction_in_past() {
        let gen = ForecastGenerator::default();
        let forecast = gen
            .generate(&trusted(30.0, 20.0), &at(0, Phase::Green), &clock_at(500))
            .unwrap();

        assert!(forecast.clamped);
        assert_eq!(forecast.steps[0].predicted_timestamp, at(501, Phase::Red).timestamp());
        // second step is not clamped, only offset from the clamped first step
        assert_eq!(forecast.steps[1].predicted_timestamp, at(531, Phase::Red).timestamp());
    }

    #[test]
    fn test_clamp_fires_on_equality() {
        let gen = ForecastGenerator::default();
        let forecast = gen
            .generate(&trusted(30.0, 20.0), &at(0, Phase::Red), &clock_at(30))
            .unwrap();
        assert!(forecast.clamped);
        assert_eq!(forecast.steps[0].predicted_timestamp, at(31, Phase::Red).timestamp());
    }

    #[test]
    fn test_alternation_over_long_horizon() {
        let gen = ForecastGenerator::new(7, 1.0);
        let forecast = gen
            .generate(&trusted(40.0, 25.0), &at(0, Phase::Green), &clock_at(0))
            .unwrap();
        assert_eq!(forecast.steps.len(), 7);
        for pair in forecast.steps.windows(2) {
            assert_ne!(pair[0].phase, pair[1].phase);
            assert!(pair[1].predicted_timestamp > pair[0].predicted_timestamp);
        }
    }

    #[test]
    fn test_timestamp_overflow_is_error() {
        // ~9.2e12 s per step walks past chrono's representable range
        let gen = ForecastGenerator::new(MAX_HORIZON, 1.0);
        let err = gen
            .generate(&trusted(9.0e12, 9.0e12), &at(0, Phase::Red), &clock_at(0))
            .unwrap_err();
        assert!(matches!(err, ForecastError::TimestampOutOfRange { .. }));
    }

    #[test]
    fn test_transitional_origin_is_error() {
        let gen = ForecastGenerator::default();
        let err = gen
            .generate(&trusted(30.0, 30.0), &at(0, Phase::Amber), &clock_at(0))
            .unwrap_err();
        assert_eq!(err, ForecastError::TransitionalOrigin { phase: Phase::Amber });
    }

    #[test]
    fn test_entries_keep_origin_offset() {
        let gen = ForecastGenerator::default();
        let forecast = gen
            .generate(&trusted(30.0, 30.0), &at(0, Phase::Red), &clock_at(0))
            .unwrap();
        let entries = forecast.to_entries();
        assert_eq!(entries[0].timestamp, "2023-05-18T08:00:30+02:00");
        assert_eq!(entries[0].state_code, 3);
        assert_eq!(entries[1].state_code, 1);
    }
}

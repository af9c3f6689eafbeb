//! Duration Computer.
//!
//! Pairs each observation with its chronological successor and measures how
//! long the observed phase persisted. Input may be sorted ascending or
//! descending; either way the sample is later-minus-earlier and the
//! chronologically last observation produces no sample.
//!
//! ```text
//! ascending : [o0, o1, o2]  ->  o0:(o1-o0)  o1:(o2-o1)
//! descending: [o2, o1, o0]  ->  o1:(o2-o1)  o0:(o1-o0)
//! ```

use signalcast_models::observation::elapsed_seconds;
use signalcast_models::{DurationSample, Observation, Phase};

use crate::error::ForecastError;

/// Direction of a timestamp-sorted sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOrder {
    Ascending,
    Descending,
}

/// Detect the sort direction of `observations`.
///
/// Sequences shorter than two, or with all-equal timestamps, report
/// `Ascending`. Mixed order fails with the index of the first element that
/// breaks the direction established by the sequence.
pub fn detect_order(observations: &[Observation]) -> Result<TimeOrder, ForecastError> {
    let mut order: Option<TimeOrder> = None;
    for (i, pair) in observations.windows(2).enumerate() {
        let (a, b) = (pair[0].timestamp(), pair[1].timestamp());
        let step = if b > a {
            TimeOrder::Ascending
        } else if b < a {
            TimeOrder::Descending
        } else {
            continue;
        };
        match order {
            None => order = Some(step),
            Some(o) if o != step => return Err(ForecastError::Unsorted { index: i + 1 }),
            Some(_) => {}
        }
    }
    Ok(order.unwrap_or(TimeOrder::Ascending))
}

/// Compute one duration sample per observation except the chronologically last.
///
/// Samples are emitted in the input's order.
pub fn compute_durations(observations: &[Observation]) -> Result<Vec<DurationSample>, ForecastError> {
    let order = detect_order(observations)?;
    let samples = observations
        .windows(2)
        .map(|pair| {
            let (earlier, later) = match order {
                TimeOrder::Ascending => (&pair[0], &pair[1]),
                TimeOrder::Descending => (&pair[1], &pair[0]),
            };
            DurationSample {
                phase: earlier.phase(),
                started_at: earlier.timestamp(),
                seconds: elapsed_seconds(earlier.timestamp(), later.timestamp()),
            }
        })
        .collect();
    Ok(samples)
}

/// Full-cycle durations: time from each `anchor` observation to the next one.
///
/// Other phases in between are ignored, and repeated anchor reports at one
/// instant count once. Input must be sorted (either direction).
pub fn cycle_durations(
    observations: &[Observation],
    anchor: Phase,
) -> Result<Vec<DurationSample>, ForecastError> {
    detect_order(observations)?;
    let mut anchors: Vec<Observation> = observations
        .iter()
        .copied()
        .filter(|o| o.phase() == anchor)
        .collect();
    // repeated reports of the same anchor instant are one cycle start
    anchors.dedup_by_key(|o| o.timestamp());
    compute_durations(&anchors)
}

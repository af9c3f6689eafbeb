//! Stable-Phase Filter and canonical ordering.

use signalcast_models::Observation;

/// Keep only red and green observations, preserving order.
pub fn stable_only(observations: &[Observation]) -> Vec<Observation> {
    observations.iter().copied().filter(Observation::is_stable).collect()
}

/// Sort ascending by timestamp, keeping every observation.
///
/// Ties keep input order. Use this for views over all phases, where a red and
/// an amber report at the same instant are both meaningful.
pub fn sort_ascending(mut observations: Vec<Observation>) -> Vec<Observation> {
    observations.sort_by_key(|o| o.timestamp());
    observations
}

/// Sort ascending by timestamp and collapse duplicate timestamps.
///
/// Observations sharing an instant collapse to the one that appeared last in
/// the input (the sort is stable, so input order decides). Instants are
/// compared in absolute time, so `08:00+02:00` and `06:00Z` are duplicates.
pub fn sort_and_collapse(observations: Vec<Observation>) -> Vec<Observation> {
    let observations = sort_ascending(observations);

    let mut collapsed: Vec<Observation> = Vec::with_capacity(observations.len());
    for obs in observations {
        match collapsed.last_mut() {
            Some(prev) if prev.timestamp() == obs.timestamp() => *prev = obs,
            _ => collapsed.push(obs),
        }
    }
    collapsed
}

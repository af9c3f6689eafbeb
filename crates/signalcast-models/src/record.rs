//! Wire shapes at the forecaster boundary.
//!
//! Input records follow the SensorThings observation shape served by the
//! traffic-light data feed (`phenomenonTime`, `result`). The snake_case names
//! `timestamp` and `state_code` are accepted as aliases.

use serde::{Deserialize, Serialize};

/// A raw, unvalidated observation record.
///
/// Both fields are optional on the wire so that a missing field surfaces as a
/// structured parse error for that record instead of failing the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "phenomenonTime", alias = "timestamp", default)]
    pub timestamp: Option<String>,

    #[serde(rename = "result", alias = "state_code", default)]
    pub state_code: Option<i64>,
}

impl RawRecord {
    pub fn new(timestamp: impl Into<String>, state_code: i64) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            state_code: Some(state_code),
        }
    }
}

/// One predicted transition as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// ISO-8601 timestamp with offset
    #[serde(rename = "phenomenonTime")]
    pub timestamp: String,

    /// State code of the predicted phase
    #[serde(rename = "result")]
    pub state_code: i64,
}

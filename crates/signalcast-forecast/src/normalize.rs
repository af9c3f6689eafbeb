//! Observation Normalizer.
//!
//! Raw records → typed [`Observation`]s. Timestamps must carry an offset
//! (RFC 3339). Records whose state code is not in the lookup table are dropped;
//! malformed or missing fields are reported per record.

use chrono::{DateTime, FixedOffset};
use signalcast_models::{Observation, ParseError, ParseErrorKind, RawRecord, StateCodeTable};
use tracing::debug;

/// Result of a lenient normalization pass.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    /// Observations in input order
    pub observations: Vec<Observation>,
    /// Records that failed to parse (skipped)
    pub rejected: Vec<ParseError>,
    /// Records dropped because their state code is unmapped
    pub dropped_unknown: usize,
}

/// Maps raw records through a [`StateCodeTable`].
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    table: &'a StateCodeTable,
}

impl<'a> Normalizer<'a> {
    pub fn new(table: &'a StateCodeTable) -> Self {
        Self { table }
    }

    /// Normalize a batch, aborting on the first malformed record.
    pub fn normalize(&self, records: &[RawRecord]) -> Result<Vec<Observation>, ParseError> {
        let mut observations = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if let Some(obs) = self.normalize_one(index, record)? {
                observations.push(obs);
            }
        }
        Ok(observations)
    }

    /// Normalize a batch, skipping malformed records and reporting them.
    pub fn normalize_lenient(&self, records: &[RawRecord]) -> NormalizedBatch {
        let mut batch = NormalizedBatch {
            observations: Vec::with_capacity(records.len()),
            ..Default::default()
        };
        for (index, record) in records.iter().enumerate() {
            match self.normalize_one(index, record) {
                Ok(Some(obs)) => batch.observations.push(obs),
                Ok(None) => batch.dropped_unknown += 1,
                Err(e) => {
                    debug!(index, error = %e, "skipping malformed record");
                    batch.rejected.push(e);
                }
            }
        }
        batch
    }

    /// `Ok(None)` means the record was well-formed but its code is unmapped.
    fn normalize_one(
        &self,
        index: usize,
        record: &RawRecord,
    ) -> Result<Option<Observation>, ParseError> {
        let raw_ts = record
            .timestamp
            .as_deref()
            .ok_or_else(|| ParseError::new(index, ParseErrorKind::MissingTimestamp))?;
        let timestamp = parse_timestamp(raw_ts).map_err(|reason| {
            ParseError::new(
                index,
                ParseErrorKind::MalformedTimestamp {
                    raw: raw_ts.to_string(),
                    reason,
                },
            )
        })?;
        let code = record
            .state_code
            .ok_or_else(|| ParseError::new(index, ParseErrorKind::MissingStateCode))?;

        let obs = Observation::from_code(timestamp, code, self.table);
        if obs.is_none() {
            debug!(index, code, "dropping record with unmapped state code");
        }
        Ok(obs)
    }
}

/// Parse an RFC 3339 timestamp, tolerating a space in place of the `T`.
fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    let trimmed = raw.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%:z"))
        .map_err(|e| e.to_string())
}

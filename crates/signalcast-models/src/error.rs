//! Record-level parse failures.

use std::fmt;

/// What was wrong with a raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// No timestamp field present
    MissingTimestamp,
    /// Timestamp present but not RFC 3339 / ISO-8601 with offset
    MalformedTimestamp { raw: String, reason: String },
    /// No state code field present
    MissingStateCode,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::MissingTimestamp => write!(f, "missing timestamp"),
            ParseErrorKind::MalformedTimestamp { raw, reason } => {
                write!(f, "malformed timestamp {:?}: {}", raw, reason)
            }
            ParseErrorKind::MissingStateCode => write!(f, "missing state code"),
        }
    }
}

/// A raw record that could not be normalized.
///
/// `index` is the position of the offending record in the input batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("record {index}: {kind}")]
pub struct ParseError {
    pub index: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(index: usize, kind: ParseErrorKind) -> Self {
        Self { index, kind }
    }
}

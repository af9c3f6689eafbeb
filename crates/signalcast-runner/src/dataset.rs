//! Observation dataset loading.
//!
//! Accepts three layouts:
//! - a JSON array of records
//! - a SensorThings response envelope `{"value": [...]}`
//! - JSONL, one record per line (`.jsonl` extension)

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use signalcast_models::RawRecord;

/// Dataset loading errors.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error in {path} line {line}: {source}")]
    JsonLine {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Bare(Vec<RawRecord>),
    Envelope { value: Vec<RawRecord> },
}

/// Load raw records from `path`.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>, DatasetError> {
    let display = path.display().to_string();
    let io_err = |source| DatasetError::Io {
        path: display.clone(),
        source,
    };

    if path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
        let reader = BufReader::new(File::open(path).map_err(io_err)?);
        let mut records = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(io_err)?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| DatasetError::JsonLine {
                path: display.clone(),
                line: line_num + 1,
                source,
            })?;
            records.push(record);
        }
        return Ok(records);
    }

    let raw = std::fs::read_to_string(path).map_err(io_err)?;
    parse_records(&raw).map_err(|source| DatasetError::Json {
        path: display.clone(),
        source,
    })
}

/// Parse a JSON array or `{"value": [...]}` envelope.
pub fn parse_records(raw: &str) -> Result<Vec<RawRecord>, serde_json::Error> {
    Ok(match serde_json::from_str::<DatasetFile>(raw)? {
        DatasetFile::Bare(records) => records,
        DatasetFile::Envelope { value } => value,
    })
}

//! Backtest Report
//!
//! Pure builder that turns per-window results into:
//! - Deterministic JSON report struct
//! - Deterministic text summary string
//!
//! ## Invariants
//! - No file I/O (the runner writes files)
//! - Abstained windows never contribute to the error aggregate
//! - Digest = SHA-256 of canonical JSON with the digest field empty

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use signalcast_forecast::{AbstainKind, AbstainReason};
use signalcast_models::{Observation, Phase};

/// Schema version for backtest reports.
pub const BACKTEST_REPORT_SCHEMA_VERSION: &str = "1";

// =============================================================================
// Per-window results
// =============================================================================

/// What happened in a single window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WindowOutcome {
    Scored {
        predicted: DateTime<FixedOffset>,
        predicted_phase: Phase,
        error_seconds: f64,
        clamped: bool,
    },
    Abstained {
        reason: AbstainReason,
    },
}

/// One evaluated window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowResult {
    /// Index of the ground-truth observation in the stable sequence
    pub index: usize,
    /// Most recent observation of the window
    pub origin: Observation,
    /// Observation that actually followed
    pub actual: Observation,
    pub outcome: WindowOutcome,
}

impl WindowResult {
    pub fn error_seconds(&self) -> Option<f64> {
        match self.outcome {
            WindowOutcome::Scored { error_seconds, .. } => Some(error_seconds),
            WindowOutcome::Abstained { .. } => None,
        }
    }
}

// =============================================================================
// BacktestReport
// =============================================================================

/// Aggregate accuracy of a backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub schema_version: String,
    pub window_size: usize,
    /// Stable observations after filtering and duplicate collapse
    pub stable_observations: usize,
    pub windows_evaluated: usize,
    pub scored: usize,
    pub abstained: usize,
    pub abstained_insufficient_data: usize,
    pub abstained_low_confidence: usize,
    /// Scored windows whose first prediction hit the past-time clamp
    pub clamped: usize,
    /// Scored windows whose predicted phase differs from the actual phase
    pub phase_mismatches: usize,
    /// Mean absolute error over scored windows; `None` when nothing was scored
    pub mean_error_seconds: Option<f64>,
    pub max_error_seconds: Option<f64>,
    pub windows: Vec<WindowResult>,
    pub digest: String,
}

impl BacktestReport {
    /// Aggregate window results and stamp the digest.
    pub fn build(
        window_size: usize,
        stable_observations: usize,
        windows: Vec<WindowResult>,
    ) -> Result<Self, serde_json::Error> {
        let mut scored = 0;
        let mut abstained_insufficient_data = 0;
        let mut abstained_low_confidence = 0;
        let mut clamped = 0;
        let mut phase_mismatches = 0;
        let mut error_sum = 0.0;
        let mut max_error: Option<f64> = None;

        for w in &windows {
            match &w.outcome {
                WindowOutcome::Scored {
                    predicted_phase,
                    error_seconds,
                    clamped: was_clamped,
                    ..
                } => {
                    scored += 1;
                    error_sum += error_seconds;
                    max_error = Some(max_error.map_or(*error_seconds, |m| m.max(*error_seconds)));
                    if *was_clamped {
                        clamped += 1;
                    }
                    if *predicted_phase != w.actual.phase() {
                        phase_mismatches += 1;
                    }
                }
                WindowOutcome::Abstained { reason } => match reason.kind() {
                    AbstainKind::InsufficientData => abstained_insufficient_data += 1,
                    AbstainKind::LowConfidence => abstained_low_confidence += 1,
                },
            }
        }

        let mut report = Self {
            schema_version: BACKTEST_REPORT_SCHEMA_VERSION.to_string(),
            window_size,
            stable_observations,
            windows_evaluated: windows.len(),
            scored,
            abstained: abstained_insufficient_data + abstained_low_confidence,
            abstained_insufficient_data,
            abstained_low_confidence,
            clamped,
            phase_mismatches,
            mean_error_seconds: (scored > 0).then(|| error_sum / scored as f64),
            max_error_seconds: max_error,
            windows,
            digest: String::new(),
        };
        report.digest = report.compute_digest_hex()?;
        Ok(report)
    }

    /// Per-window errors as `(index, seconds)`, scored windows only.
    pub fn error_sequence(&self) -> Vec<(usize, f64)> {
        self.windows
            .iter()
            .filter_map(|w| w.error_seconds().map(|e| (w.index, e)))
            .collect()
    }

    /// Canonical JSON with the digest field emptied.
    pub fn to_canonical_json_with_empty_digest(&self) -> Result<String, serde_json::Error> {
        let mut canonical = self.clone();
        canonical.digest = String::new();
        serde_json::to_string(&canonical)
    }

    /// SHA-256 of the canonical JSON, hex encoded.
    pub fn compute_digest_hex(&self) -> Result<String, serde_json::Error> {
        let canonical = self.to_canonical_json_with_empty_digest()?;
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deterministic text summary.
    pub fn to_text_summary(&self) -> String {
        let rule = "=".repeat(80);
        let fmt_secs = |v: Option<f64>| match v {
            Some(s) => format!("{:.3}s", s),
            None => "n/a".to_string(),
        };

        let mut lines = vec![
            rule.clone(),
            "PHASE FORECAST BACKTEST".to_string(),
            rule.clone(),
            format!("Window:        {} stable observations", self.window_size),
            format!("Observations:  {} stable", self.stable_observations),
            format!("Windows:       {}", self.windows_evaluated),
            format!("Scored:        {}", self.scored),
            format!(
                "Abstained:     {} ({} insufficient data / {} low confidence)",
                self.abstained, self.abstained_insufficient_data, self.abstained_low_confidence
            ),
            format!("Clamped:       {}", self.clamped),
            format!("Phase misses:  {}", self.phase_mismatches),
            format!("Mean error:    {}", fmt_secs(self.mean_error_seconds)),
            format!("Max error:     {}", fmt_secs(self.max_error_seconds)),
            "-".repeat(80),
            format!("Report Digest: {}", self.digest),
            rule,
        ];
        lines.push(String::new());
        lines.join("\n")
    }
}

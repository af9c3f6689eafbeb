//! signalcast CLI: red/green transition forecasts for cyclic signals.
//!
//! ## Usage
//!
//! ```bash
//! # Forecast the next transitions from a history dump
//! signalcast forecast --input history.json --signal-id 50850
//!
//! # Same, with "now" pinned for reproducible output
//! signalcast forecast --input history.json --signal-id 50850 --now 2023-05-18T08:02:00+02:00
//!
//! # Per-phase duration statistics
//! signalcast stats --input history.json --anchor red
//!
//! # Sliding-window accuracy backtest
//! signalcast backtest --input history.jsonl --window 16 --format json
//! ```
//!
//! ## Exit Codes
//! - 0: Success (a forecast may still be empty when the forecaster abstains)
//! - 2: Error (missing files, malformed records, invalid config)

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use signalcast_models::Phase;
use signalcast_runner::{
    init_tracing, load_records, run_backtest, run_forecast, run_stats, RunnerConfig,
};
use tracing::info;

/// signalcast: forecast red/green transitions of a cyclic signal.
#[derive(Parser)]
#[command(name = "signalcast")]
#[command(version)]
#[command(about = "Phase transition forecaster and backtest harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for rotated log files (stderr only when omitted)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Output format: text (default) or json
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum AnchorPhase {
    Red,
    Green,
}

impl From<AnchorPhase> for Phase {
    fn from(anchor: AnchorPhase) -> Self {
        match anchor {
            AnchorPhase::Red => Phase::Red,
            AnchorPhase::Green => Phase::Green,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast the next phase transitions of one signal
    Forecast {
        /// Observation history (JSON array, {"value": [...]} envelope, or .jsonl)
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Signal identifier, used for logging
        #[arg(long, short = 's')]
        signal_id: String,

        /// Number of transitions to forecast (overrides config)
        #[arg(long)]
        horizon: Option<usize>,

        /// Pin "now" to an RFC 3339 instant instead of the wall clock
        #[arg(long, value_parser = parse_instant)]
        now: Option<DateTime<Utc>>,
    },

    /// Per-phase duration statistics and cycle length
    Stats {
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Phase that starts a full cycle
        #[arg(long, default_value = "red")]
        anchor: AnchorPhase,
    },

    /// Sliding-window accuracy backtest over a history
    Backtest {
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Stable observations per window (overrides config)
        #[arg(long, short = 'w')]
        window: Option<usize>,
    },
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 instant '{}': {}", raw, e))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guards = init_tracing("signalcast", cli.log_dir.as_deref());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = RunnerConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Forecast {
            input,
            signal_id,
            horizon,
            now,
        } => {
            if let Some(h) = horizon {
                config.forecast.horizon = h;
            }
            let records = load_records(&input)?;
            let entries = run_forecast(&config, &signal_id, &records, now)
                .with_context(|| format!("forecast failed for signal {}", signal_id))?;
            info!(signal_id = %signal_id, entries = entries.len(), "forecast complete");

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
                OutputFormat::Text => {
                    if entries.is_empty() {
                        println!("No forecast for signal {}", signal_id);
                    }
                    for entry in &entries {
                        println!("{}  {}", entry.timestamp, entry.state_code);
                    }
                }
            }
        }

        Commands::Stats { input, anchor } => {
            let records = load_records(&input)?;
            let report = run_stats(&records, anchor.into()).context("statistics failed")?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Text => print!("{}", report.to_text_summary()),
            }
        }

        Commands::Backtest { input, window } => {
            if let Some(w) = window {
                config.backtest.window_size = w;
            }
            let records = load_records(&input)?;
            let report = run_backtest(&config, &records).context("backtest failed")?;
            match cli.format {
                OutputFormat::Json => println!("{}", report.to_json()?),
                OutputFormat::Text => print!("{}", report.to_text_summary()),
            }
        }
    }

    Ok(())
}

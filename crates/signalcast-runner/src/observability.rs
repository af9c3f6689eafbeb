//! # Structured Logging
//!
//! ## Logging Architecture
//! - **stderr**: compact, human-friendly; stdout is reserved for command output
//! - **file** (optional): daily rotation to `{log_dir}/signalcast.log`,
//!   non-blocking, full metadata
//! - **RUST_LOG**: honored by both layers; default `signalcast=info,warn`

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "signalcast=info,warn";

/// Guards that must be held for the lifetime of the process.
/// Dropping this will cause buffered file logs to be lost.
pub struct TracingGuards {
    _file_guard: Option<WorkerGuard>,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize tracing with a stderr layer and, when `log_dir` is given, a
/// rotated file layer.
pub fn init_tracing(service_name: &str, log_dir: Option<&Path>) -> TracingGuards {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact()
        .with_filter(env_filter());

    let (file_layer, file_guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, format!("{}.log", service_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_filter(env_filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    tracing::debug!(service = service_name, file_logging = log_dir.is_some(), "tracing initialized");

    TracingGuards {
        _file_guard: file_guard,
    }
}

// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Builds a `tracing` subscriber with a console layer and, when a log
//! directory is given, a non-blocking file layer inside a timestamped run
//! folder:
//!
//! ```text
//! ./logs/
//!   └── run_20260101_120000/
//!       └── culture.log
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging initialization result
///
/// Holds the non-blocking writer guard; dropping it flushes and stops file
/// logging, so keep it alive for the process lifetime.
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// The run's log directory, when file logging is enabled.
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Initialize logging with console output and optional file output.
///
/// # Arguments
/// * `level` - default filter ("trace" .. "error"); `RUST_LOG` overrides it
/// * `log_dir` - base directory for per-run log folders; `None` disables
///   file logging
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<LoggingGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    let (file_layer, file_guard, run_folder) = match log_dir {
        Some(base) => {
            let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
            let run_folder = base.join(format!("run_{}", timestamp));
            std::fs::create_dir_all(&run_folder).with_context(|| {
                format!("failed to create log directory: {}", run_folder.display())
            })?;

            let appender = tracing_appender::rolling::never(&run_folder, "culture.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .boxed();
            (Some(layer), Some(guard), Some(run_folder))
        }
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("logging already initialized")?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_dir: run_folder,
    })
}

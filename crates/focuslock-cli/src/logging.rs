//! File logging setup.
//!
//! The writing session owns the terminal, so logs go to a daily-rolling file
//! in the data directory instead of stderr.

use anyhow::{Context, Result};
use focuslock_infrastructure::FocusPaths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "focuslock.log";

/// Installs the global subscriber. Keep the returned guard alive until
/// exit or buffered lines are lost.
pub fn init(paths: &FocusPaths, verbose: bool) -> Result<WorkerGuard> {
    let logs_dir = paths.logs_dir().context("Failed to resolve log directory")?;
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create log directory {:?}", logs_dir))?;

    let file_appender = tracing_appender::rolling::daily(&logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .init();

    tracing::debug!("[Bootstrap] Logging to {:?}", logs_dir);
    Ok(guard)
}

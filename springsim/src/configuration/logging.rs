//! File logging for the `springsim` binary.
//!
//! The library only emits `ftlog` records; the host decides where they go.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ftlog::{
    appender::{FileAppender, Period},
    LevelFilter, LoggerGuard,
};

/// Configures `ftlog` to write to `logs/{file_name}.log`, rotated daily.
///
/// The returned guard must be kept alive for the whole run; dropping it
/// flushes and stops the logger.
///
/// # Errors
///
/// - If the logs directory could not be located/created.
/// - If a logger was already initialized.
pub fn configure_logger(file_name: &str) -> Result<(LoggerGuard, PathBuf)> {
    let root_dir = PathBuf::from(".")
        .canonicalize()
        .context("cannot resolve the working directory")?;
    let logs_dir = root_dir.join("logs");
    if !logs_dir.exists() {
        std::fs::create_dir(&logs_dir).with_context(|| format!("cannot create {}", logs_dir.display()))?;
    }
    let log_path = logs_dir.join(format!("{file_name}.log"));

    let writer = FileAppender::builder().path(&log_path).rotate(Period::Day).build();

    let err_path = log_path.with_extension("err.log");

    let guard = ftlog::Builder::new()
        .max_log_level(LevelFilter::Info)
        .root(writer)
        // warnings from the appender itself go to a separate file
        .filter("ftlog::appender", "ftlog-appender", LevelFilter::Warn)
        .appender("ftlog-appender", FileAppender::new(err_path))
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot initialize logger: {e}"))?;

    Ok((guard, log_path))
}

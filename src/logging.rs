//! Log sink setup for the binary.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use moodle_sync_core::LogLevel;
use tracing_subscriber::EnvFilter;

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LogSink {
    /// Appended to a file (created with its parent directories if absent).
    File(PathBuf),
    Stderr,
}

/// Picks the default filter level.
///
/// Priority: quiet flag > verbose flag > configured level. `RUST_LOG`, when
/// set, overrides all of them in [`init_tracing`].
pub(crate) fn resolve_log_level(verbose: u8, quiet: bool, configured: LogLevel) -> &'static str {
    if quiet {
        return LogLevel::Error.as_str();
    }
    match verbose {
        0 => configured.as_str(),
        1 => LogLevel::Debug.as_str(),
        _ => LogLevel::Trace.as_str(),
    }
}

/// Installs the global tracing subscriber.
pub(crate) fn init_tracing(default_level: &str, sink: &LogSink) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match sink {
        LogSink::File(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        LogSink::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory '{}'", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file '{}'", path.display()))
}

//! Process-wide logging bootstrap
//!
//! Installs a `tracing` subscriber that writes every event twice: to the
//! console (stderr) and, appended, to a persistent log file. Each line
//! carries a timestamp, the level and the message.

use crate::config::OutputConfig;
use crate::ScoutError;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Builds the level filter for the given CLI verbosity
pub fn build_filter(verbose: u8, quiet: bool) -> EnvFilter {
    if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("job_scout=info,warn"),
            1 => EnvFilter::new("job_scout=debug,info"),
            2 => EnvFilter::new("job_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    }
}

/// Returns the log file path for the output settings
pub fn log_file_path(output: &OutputConfig) -> PathBuf {
    Path::new(&output.logs_dir).join(&output.log_file)
}

/// Opens the persistent log for appending, creating the logs directory if needed
pub fn open_log_file(output: &OutputConfig) -> std::io::Result<(PathBuf, File)> {
    let path = log_file_path(output);
    fs::create_dir_all(&output.logs_dir)?;
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Plain-text fmt layer writing to the persistent log
fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
}

/// Initializes console and file logging
///
/// Creates the logs directory if needed and opens the log file for
/// appending. Fails if a global subscriber is already installed.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the log file in use
/// * `Err(ScoutError)` - The file could not be opened or logging was already set up
pub fn init_logging(output: &OutputConfig, verbose: u8, quiet: bool) -> Result<PathBuf, ScoutError> {
    let (path, file) = open_log_file(output)?;

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    tracing_subscriber::registry()
        .with(build_filter(verbose, quiet))
        .with(console)
        .with(file_layer(file))
        .try_init()
        .map_err(|e| ScoutError::Logging(e.to_string()))?;

    Ok(path)
}

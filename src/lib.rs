//! Job-Scout: a pluggable job-posting scraper runtime
//!
//! This crate discovers registered scraper units, runs each one through a
//! fetch → parse → save lifecycle, isolates failures so one broken unit does
//! not abort the batch, and owns the headless browser session a unit may
//! need for client-rendered pages.

pub mod config;
pub mod driver;
pub mod fetch;
pub mod logging;
pub mod output;
mod panics;
pub mod registry;
pub mod runner;
pub mod scraper;
pub mod scrapers;
pub mod text;

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Classification of every failure the runtime can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid fetch mode, target or other construction parameter
    Configuration,
    /// No usable browser backend on this host
    Environment,
    /// Network failure, timeout or driver navigation failure
    Transport,
    /// Non-2xx HTTP status
    InvalidResponse,
    /// Structural extraction failure
    Parse,
    /// Persistence failure
    Save,
    /// Anything not classified above
    Unexpected,
}

impl ErrorKind {
    /// Returns true for the expected, deliberately raised kinds
    pub fn is_framework(&self) -> bool {
        !matches!(self, Self::Unexpected)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Configuration => "configuration",
            Self::Environment => "environment",
            Self::Transport => "transport",
            Self::InvalidResponse => "invalid-response",
            Self::Parse => "parse",
            Self::Save => "save",
            Self::Unexpected => "unexpected",
        };
        write!(f, "{}", s)
    }
}

/// Top-level error type for process bootstrap
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised while constructing a scraper unit
///
/// Any of these excludes the unit from the runnable set; they never abort
/// discovery of the other units.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid fetch mode '{0}' (expected 'http' or 'driver')")]
    InvalidFetchMode(String),

    #[error("{unit} has an invalid target URL '{url}': {source}")]
    InvalidTarget {
        unit: String,
        url: String,
        source: ::url::ParseError,
    },

    #[error("{unit} settle wait of {seconds}s exceeds the {max}s limit")]
    WaitTooLong { unit: String, seconds: u64, max: u64 },

    #[error("failed to initialise {unit}: {message}")]
    Unit { unit: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("no supported browser found on {os}; install Chrome/Chromium or Firefox with geckodriver")]
    NoBrowser { os: driver::HostOs },

    #[error("failed to launch {browser}: {message}")]
    DriverLaunch {
        browser: driver::BrowserFamily,
        message: String,
    },
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoBrowser { .. } | Self::DriverLaunch { .. } => ErrorKind::Environment,
            _ => ErrorKind::Configuration,
        }
    }
}

/// Classified runtime failures raised by fetch strategies and units
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned HTTP {status}")]
    InvalidResponse { url: String, status: u16 },

    #[error("browser driver error: {0}")]
    Driver(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("failed to save {path}: {message}")]
    Save { path: PathBuf, message: String },
}

impl ScrapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } | Self::Driver(_) => ErrorKind::Transport,
            Self::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Save { .. } => ErrorKind::Save,
        }
    }
}

/// Error surfaced by a unit's fetch, parse or save stage
///
/// The run loop logs the two tiers differently: classified failures get a
/// short message, unexpected ones get the full diagnostic chain.
#[derive(Debug, Error)]
pub enum UnitError {
    #[error(transparent)]
    Framework(#[from] ScrapeError),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl UnitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Framework(e) => e.kind(),
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

/// Result type alias for bootstrap operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for unit stages
pub type UnitResult<T> = std::result::Result<T, UnitError>;

// Re-export commonly used types
pub use config::Settings;
pub use fetch::{FetchMode, RawContent};
pub use registry::Registry;
pub use runner::{RunOutcome, RunSummary, Runner};
pub use scraper::{JobPosting, Scraper, ScraperBase};

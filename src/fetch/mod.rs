//! Fetch strategies
//!
//! A fetch strategy decides *how* a page's raw content is retrieved:
//! - `HttpFetcher`: one stateless GET per call
//! - `DriverFetcher`: navigate a live headless browser and wait for rendering
//!
//! The mode is chosen once when a unit is constructed and never changes.

mod driver;
mod http;

pub use driver::DriverFetcher;
pub use http::{build_http_client, HttpFetcher};

use crate::{BuildError, ScrapeError};
use std::fmt;
use std::str::FromStr;

/// How a unit retrieves its pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Plain HTTP GET
    Http,
    /// Headless browser with a fixed settle wait
    Driver,
}

impl FromStr for FetchMode {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "requests" => Ok(Self::Http),
            "driver" | "selenium" => Ok(Self::Driver),
            _ => Err(BuildError::InvalidFetchMode(s.to_string())),
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Driver => write!(f, "driver"),
        }
    }
}

/// Unparsed page content returned by a fetch
///
/// Ownership moves into the parse step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent(String);

impl RawContent {
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The strategy a unit was constructed with
pub enum Fetcher {
    Http(HttpFetcher),
    Driver(DriverFetcher),
}

impl Fetcher {
    pub fn mode(&self) -> FetchMode {
        match self {
            Self::Http(_) => FetchMode::Http,
            Self::Driver(_) => FetchMode::Driver,
        }
    }

    pub async fn fetch(&mut self, url: &str) -> Result<RawContent, ScrapeError> {
        match self {
            Self::Http(fetcher) => fetcher.fetch(url).await,
            Self::Driver(fetcher) => fetcher.fetch(url).await,
        }
    }

    /// Releases the browser session if one is held; a no-op otherwise
    pub async fn quit(&mut self) -> anyhow::Result<()> {
        match self {
            Self::Http(_) => Ok(()),
            Self::Driver(fetcher) => fetcher.quit().await,
        }
    }

    /// Returns true while a browser session is held
    pub fn has_session(&self) -> bool {
        match self {
            Self::Http(_) => false,
            Self::Driver(fetcher) => fetcher.is_active(),
        }
    }
}

//! Scraper contract
//!
//! Every pluggable unit implements [`Scraper`]: `fetch`, `parse` and `save`,
//! composed by [`Scraper::run`]. Units embed a [`ScraperBase`] which owns the
//! unit's name, target and fetch strategy, so they only write `parse` and
//! `save` themselves.

use crate::config::{Settings, MAX_WAIT_SECONDS};
use crate::driver::BrowserProbe;
use crate::fetch::{DriverFetcher, FetchMode, Fetcher, HttpFetcher, RawContent};
use crate::{BuildError, UnitResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// One job posting produced by a unit's parse step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPosting {
    pub source: String,
    pub id: String,
    pub title: String,
    pub reference: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub url: String,
    pub date_posted: Option<String>,
    pub date_updated: Option<String>,
    pub employment_type: Option<String>,
    pub closing_date: Option<String>,

    /// Source-specific fields with no common column
    pub custom_fields: BTreeMap<String, String>,
}

/// Built-in defaults a unit declares; settings may override each of them
#[derive(Debug, Clone)]
pub struct UnitDefaults {
    pub fetch_mode: FetchMode,
    pub wait_seconds: Option<u64>,
    pub url: Option<&'static str>,
}

impl UnitDefaults {
    pub fn http(url: Option<&'static str>) -> Self {
        Self {
            fetch_mode: FetchMode::Http,
            wait_seconds: None,
            url,
        }
    }

    pub fn driver(url: Option<&'static str>, wait_seconds: u64) -> Self {
        Self {
            fetch_mode: FetchMode::Driver,
            wait_seconds: Some(wait_seconds),
            url,
        }
    }
}

/// State shared by every unit: identity, target and fetch strategy
pub struct ScraperBase {
    name: String,
    target: Option<Url>,
    fetcher: Fetcher,
}

impl ScraperBase {
    /// Resolves settings over `defaults` and acquires the fetch strategy
    ///
    /// Driver mode launches the browser here, so a host without one fails
    /// construction rather than the first fetch.
    pub async fn new(
        name: &str,
        settings: &Settings,
        defaults: UnitDefaults,
    ) -> Result<Self, BuildError> {
        let unit = settings.unit(name);

        let mode = match unit.fetch_mode.as_deref() {
            Some(mode) => mode.parse::<FetchMode>()?,
            None => defaults.fetch_mode,
        };

        let target = match unit.url.as_deref().or(defaults.url) {
            Some(url) => Some(Url::parse(url).map_err(|source| BuildError::InvalidTarget {
                unit: name.to_string(),
                url: url.to_string(),
                source,
            })?),
            None => None,
        };

        let fetcher = match mode {
            FetchMode::Http => {
                Fetcher::Http(HttpFetcher::new(&settings.http).map_err(BuildError::HttpClient)?)
            }
            FetchMode::Driver => {
                let wait = unit
                    .wait_seconds
                    .or(defaults.wait_seconds)
                    .unwrap_or(settings.driver.wait_seconds);
                if wait > MAX_WAIT_SECONDS {
                    return Err(BuildError::WaitTooLong {
                        unit: name.to_string(),
                        seconds: wait,
                        max: MAX_WAIT_SECONDS,
                    });
                }
                let probe = match &settings.driver.search_path {
                    Some(path) => BrowserProbe::with_search_path(path),
                    None => BrowserProbe::from_env(),
                };
                Fetcher::Driver(DriverFetcher::launch(&probe, Duration::from_secs(wait)).await?)
            }
        };

        Ok(Self {
            name: name.to_string(),
            target,
            fetcher,
        })
    }

    /// Builds a base from parts already resolved by the caller
    pub fn from_parts(name: impl Into<String>, target: Option<Url>, fetcher: Fetcher) -> Self {
        Self {
            name: name.into(),
            target,
            fetcher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> Option<&Url> {
        self.target.as_ref()
    }

    pub fn fetch_mode(&self) -> FetchMode {
        self.fetcher.mode()
    }

    pub fn has_driver(&self) -> bool {
        self.fetcher.has_session()
    }

    pub fn fetcher_mut(&mut self) -> &mut Fetcher {
        &mut self.fetcher
    }
}

/// The contract every pluggable unit satisfies
///
/// `parse` and `save` are unit-specific. `fetch` delegates to the base's
/// strategy and `teardown` releases the browser session, if any; both can
/// be overridden.
#[async_trait]
pub trait Scraper: Send {
    fn base(&self) -> &ScraperBase;

    fn base_mut(&mut self) -> &mut ScraperBase;

    fn name(&self) -> &str {
        self.base().name()
    }

    /// The URL the run loop fetches; `None` means the unit is not runnable
    fn target(&self) -> Option<&Url> {
        self.base().target()
    }

    async fn fetch(&mut self, target: &Url) -> UnitResult<RawContent> {
        Ok(self.base_mut().fetcher_mut().fetch(target.as_str()).await?)
    }

    async fn parse(&mut self, raw: RawContent) -> UnitResult<Vec<JobPosting>>;

    /// Persists the records and returns how many were written
    async fn save(&mut self, records: Vec<JobPosting>) -> UnitResult<usize>;

    /// Releases unit-held resources; must tolerate being called with nothing held
    async fn teardown(&mut self) -> anyhow::Result<()> {
        self.base_mut().fetcher_mut().quit().await
    }

    /// `save(parse(fetch(target)))`; any stage failure aborts the rest
    async fn run(&mut self, target: &Url) -> UnitResult<usize> {
        let raw = self.fetch(target).await?;
        let records = self.parse(raw).await?;
        self.save(records).await
    }
}

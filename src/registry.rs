//! Unit registry and discovery
//!
//! Units are listed in an explicit registration table (name → constructor)
//! instead of being found by scanning modules at runtime. Discovery builds
//! one instance of each enabled registration, in registration order.

use crate::config::Settings;
use crate::panics::{self, panic_message};
use crate::scraper::Scraper;
use crate::BuildError;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Constructor stored in the registry
pub type Constructor =
    for<'a> fn(&'a Settings) -> BoxFuture<'a, Result<Box<dyn Scraper>, BuildError>>;

/// One registered unit
#[derive(Clone)]
pub struct Registration {
    pub name: &'static str,
    pub build: Constructor,
}

/// Why a registered unit did not make it into the runnable set
#[derive(Debug)]
pub enum DiscoveryFailure {
    /// The constructor returned an error
    Build(BuildError),
    /// The constructor panicked
    Panicked(String),
}

impl std::fmt::Display for DiscoveryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Build(e) => write!(f, "{} error: {}", e.kind(), e),
            Self::Panicked(message) => write!(f, "constructor panicked: {}", message),
        }
    }
}

/// Result of a discovery pass
pub struct Discovery {
    /// Constructed units, in registration order
    pub units: Vec<Box<dyn Scraper>>,

    /// Units excluded by a construction failure
    pub failures: Vec<(String, DiscoveryFailure)>,

    /// Units turned off in settings
    pub disabled: Vec<String>,
}

/// Explicit table of available units
#[derive(Clone, Default)]
pub struct Registry {
    entries: Vec<Registration>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every unit shipped with the crate
    pub fn builtin() -> Self {
        crate::scrapers::register_all(Self::new())
    }

    /// Adds a unit; a later registration with the same name replaces the earlier one
    pub fn register(mut self, name: &'static str, build: Constructor) -> Self {
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.build = build,
            None => self.entries.push(Registration { name, build }),
        }
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Constructs one instance of every enabled unit
    ///
    /// `only`, when non-empty, restricts discovery to the named units. A
    /// unit whose constructor fails or panics is logged and skipped; the
    /// remaining units are still built.
    pub async fn discover(&self, settings: &Settings, only: &[String]) -> Discovery {
        let mut discovery = Discovery {
            units: Vec::new(),
            failures: Vec::new(),
            disabled: Vec::new(),
        };

        for entry in &self.entries {
            panics::arm();
            if !only.is_empty() && !only.iter().any(|name| name == entry.name) {
                continue;
            }

            if !settings.unit(entry.name).enabled {
                tracing::info!("{} is disabled in settings, not loading", entry.name);
                discovery.disabled.push(entry.name.to_string());
                continue;
            }

            let built = AssertUnwindSafe((entry.build)(settings))
                .catch_unwind()
                .await;

            match built {
                Ok(Ok(unit)) => {
                    tracing::debug!("Loaded {}", entry.name);
                    discovery.units.push(unit);
                }
                Ok(Err(e)) => {
                    tracing::error!("Failed to load {}: {}", entry.name, e);
                    discovery
                        .failures
                        .push((entry.name.to_string(), DiscoveryFailure::Build(e)));
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    let detail = panics::panic_error(panic.as_ref());
                    tracing::error!("Failed to load {}: constructor {:#}", entry.name, detail);
                    discovery
                        .failures
                        .push((entry.name.to_string(), DiscoveryFailure::Panicked(message)));
                }
            }
        }

        for name in only {
            if !self.entries.iter().any(|entry| entry.name == name) {
                tracing::warn!("No scraper registered under '{}'", name);
            }
        }

        discovery
    }
}

//! Run loop - sequential orchestration of discovered units
//!
//! Each unit moves through
//! `Start → CheckRunnable → Fetch → Parse → Save → Complete`, and always
//! through `Teardown` afterwards, whatever happened before. Failures are
//! classified and logged; none of them stops the loop.

use crate::panics::{self, panic_message};
use crate::registry::Discovery;
use crate::scraper::Scraper;
use crate::{ErrorKind, ScrapeError, UnitError};
use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

/// Result of running one unit
#[derive(Debug)]
pub enum RunOutcome {
    /// All three stages completed
    Success { elapsed: Duration, records: usize },

    /// A classified failure raised by a strategy or the unit
    FrameworkError { unit: String, error: ScrapeError },

    /// Anything else, including a panic inside a stage
    UnexpectedError { unit: String, error: anyhow::Error },

    /// The unit had nothing to run
    Skipped { reason: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::FrameworkError { .. } | Self::UnexpectedError { .. })
    }

    /// Error classification for failed outcomes
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::FrameworkError { error, .. } => Some(error.kind()),
            Self::UnexpectedError { .. } => Some(ErrorKind::Unexpected),
            _ => None,
        }
    }
}

/// Aggregate result of a run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Per-unit outcomes in execution order
    pub outcomes: Vec<(String, RunOutcome)>,

    /// Units that failed construction and never ran
    pub excluded: usize,
}

impl RunSummary {
    pub fn discovered(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.count(RunOutcome::is_success)
    }

    pub fn skipped(&self) -> usize {
        self.count(RunOutcome::is_skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(RunOutcome::is_failure)
    }

    /// Looks up the outcome recorded for a unit
    pub fn outcome(&self, unit: &str) -> Option<&RunOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == unit)
            .map(|(_, outcome)| outcome)
    }

    fn count(&self, predicate: fn(&RunOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| predicate(o)).count()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} discovered, {} succeeded, {} skipped, {} failed",
            self.discovered(),
            self.succeeded(),
            self.skipped(),
            self.failed()
        )?;
        if self.excluded > 0 {
            write!(f, " ({} excluded at load)", self.excluded)?;
        }
        Ok(())
    }
}

/// Sequential run loop over discovered units
#[derive(Debug, Default)]
pub struct Runner;

impl Runner {
    pub fn new() -> Self {
        Self
    }

    /// Runs every unit of a discovery pass, counting its load failures as excluded
    pub async fn run_discovery(&self, discovery: Discovery) -> RunSummary {
        let excluded = discovery.failures.len();
        let mut summary = self.run(discovery.units).await;
        summary.excluded = excluded;
        summary
    }

    /// Runs each unit to completion, teardown included, before starting the next
    pub async fn run(&self, units: Vec<Box<dyn Scraper>>) -> RunSummary {
        tracing::info!("Discovered {} scraper(s). Starting run...", units.len());

        let mut summary = RunSummary::default();
        for mut unit in units {
            let name = unit.name().to_string();
            let outcome = self.run_unit(unit.as_mut()).await;
            summary.outcomes.push((name, outcome));
            // `unit` is dropped here, after its teardown
        }

        tracing::info!("All scrapers finished: {}", summary);
        summary
    }

    /// Runs one unit and guarantees its teardown
    pub async fn run_unit(&self, unit: &mut dyn Scraper) -> RunOutcome {
        let name = unit.name().to_string();
        let start = Instant::now();
        tracing::info!("Running scraper: {}", name);

        let outcome = match unit.target().cloned() {
            None => {
                tracing::warn!("{} has no target URL configured, skipping", name);
                RunOutcome::Skipped {
                    reason: "no target URL configured".to_string(),
                }
            }
            Some(target) => {
                panics::arm();
                let result = AssertUnwindSafe(unit.run(&target)).catch_unwind().await;
                match result {
                    Ok(Ok(records)) => {
                        let elapsed = start.elapsed();
                        tracing::info!(
                            "{} completed successfully in {:.2}s ({} record(s))",
                            name,
                            elapsed.as_secs_f64(),
                            records
                        );
                        RunOutcome::Success { elapsed, records }
                    }
                    Ok(Err(UnitError::Framework(error))) => {
                        tracing::error!(kind = %error.kind(), "{} failed (framework error): {}", name, error);
                        RunOutcome::FrameworkError { unit: name.clone(), error }
                    }
                    Ok(Err(UnitError::Unexpected(error))) => {
                        tracing::error!(unexpected = true, "Unexpected error in {}: {:?}", name, error);
                        RunOutcome::UnexpectedError { unit: name.clone(), error }
                    }
                    Err(panic) => {
                        let error = panics::panic_error(panic.as_ref());
                        tracing::error!(unexpected = true, "Unexpected error in {}: {:?}", name, error);
                        RunOutcome::UnexpectedError { unit: name.clone(), error }
                    }
                }
            }
        };

        self.teardown(unit, &name).await;
        outcome
    }

    /// Releases unit resources; failures here are logged and never change the outcome
    async fn teardown(&self, unit: &mut dyn Scraper, name: &str) {
        match AssertUnwindSafe(unit.teardown()).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Teardown of {} failed: {:#}", name, e),
            Err(panic) => tracing::warn!(
                "Teardown of {} panicked: {}",
                name,
                panic_message(panic.as_ref())
            ),
        }
    }
}

//! Shared fixtures: stub units, teardown counters and log capture

use async_trait::async_trait;
use job_scout::config::HttpConfig;
use job_scout::fetch::{Fetcher, HttpFetcher, RawContent};
use job_scout::output::write_postings;
use job_scout::{JobPosting, ScrapeError, Scraper, ScraperBase, UnitResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use url::Url;

/// What a stub unit does once its page is fetched
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// One posting per `<li>` in the page, saved as CSV
    Succeed,
    /// Classified parse failure
    ParseError,
    /// Unclassified failure while saving
    UnexpectedSave,
    /// Panics inside parse
    PanicInParse,
}

pub struct StubUnit {
    base: ScraperBase,
    behavior: Behavior,
    raw_dir: PathBuf,
    teardowns: Arc<AtomicUsize>,
    failing_teardown: bool,
}

impl StubUnit {
    pub fn new(name: &str, target: Option<&str>, behavior: Behavior, raw_dir: &Path) -> Self {
        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
        Self {
            base: ScraperBase::from_parts(
                name,
                target.map(|t| Url::parse(t).unwrap()),
                Fetcher::Http(fetcher),
            ),
            behavior,
            raw_dir: raw_dir.to_path_buf(),
            teardowns: Arc::new(AtomicUsize::new(0)),
            failing_teardown: false,
        }
    }

    pub fn with_failing_teardown(mut self) -> Self {
        self.failing_teardown = true;
        self
    }

    /// Counter incremented by every teardown call
    pub fn teardown_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.teardowns)
    }

    pub fn boxed(self) -> Box<dyn Scraper> {
        Box::new(self)
    }
}

#[async_trait]
impl Scraper for StubUnit {
    fn base(&self) -> &ScraperBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ScraperBase {
        &mut self.base
    }

    async fn parse(&mut self, raw: RawContent) -> UnitResult<Vec<JobPosting>> {
        match self.behavior {
            Behavior::ParseError => {
                Err(ScrapeError::Parse("expected job list not found".to_string()).into())
            }
            Behavior::PanicInParse => panic!("stub parser exploded"),
            Behavior::Succeed | Behavior::UnexpectedSave => Ok(raw
                .as_str()
                .matches("<li>")
                .enumerate()
                .map(|(i, _)| JobPosting {
                    source: self.name().to_string(),
                    id: (i + 1).to_string(),
                    title: format!("Job {}", i + 1),
                    ..JobPosting::default()
                })
                .collect()),
        }
    }

    async fn save(&mut self, records: Vec<JobPosting>) -> UnitResult<usize> {
        if let Behavior::UnexpectedSave = self.behavior {
            return Err(anyhow::anyhow!("disk quota exceeded").into());
        }
        let name = self.name().to_string();
        write_postings(&self.raw_dir, &name, &records)?;
        Ok(records.len())
    }

    async fn teardown(&mut self) -> anyhow::Result<()> {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
        if self.failing_teardown {
            anyhow::bail!("session already gone");
        }
        self.base_mut().fetcher_mut().quit().await
    }
}

/// One captured log event
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// In-memory tracing layer
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<LogEntry>>>);

impl CapturedLogs {
    /// Installs the layer as the thread's default subscriber until the guard drops
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.0.lock().unwrap().clone()
    }

    /// Entries at `level` whose message mentions `needle`
    pub fn matching(&self, level: Level, needle: &str) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level && e.message.contains(needle))
            .collect()
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.0.lock().unwrap().push(LogEntry {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

//! Driver-mode units with a scripted browser session

use crate::common::{Behavior, StubUnit};
use anyhow::Result;
use async_trait::async_trait;
use job_scout::driver::{BrowserFamily, BrowserSession};
use job_scout::fetch::{DriverFetcher, Fetcher, RawContent};
use job_scout::{ErrorKind, JobPosting, RunOutcome, Runner, Scraper, ScraperBase, UnitResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

#[derive(Clone, Default)]
struct SessionLog {
    visited: Arc<Mutex<Vec<String>>>,
    quits: Arc<AtomicUsize>,
}

struct ScriptedSession {
    page: &'static str,
    fail_navigation: bool,
    log: SessionLog,
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    fn family(&self) -> BrowserFamily {
        BrowserFamily::Chrome
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        if self.fail_navigation {
            anyhow::bail!("net::ERR_NAME_NOT_RESOLVED");
        }
        self.log.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        Ok(self.page.to_string())
    }

    async fn quit(self: Box<Self>) -> Result<()> {
        self.log.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Counts rendered rows; relies on the default fetch and teardown
struct RenderedUnit {
    base: ScraperBase,
}

#[async_trait]
impl Scraper for RenderedUnit {
    fn base(&self) -> &ScraperBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ScraperBase {
        &mut self.base
    }

    async fn parse(&mut self, raw: RawContent) -> UnitResult<Vec<JobPosting>> {
        Ok(raw
            .as_str()
            .matches("class=\"row\"")
            .map(|_| JobPosting::default())
            .collect())
    }

    async fn save(&mut self, records: Vec<JobPosting>) -> UnitResult<usize> {
        Ok(records.len())
    }
}

fn rendered_unit(name: &str, fail_navigation: bool, log: &SessionLog) -> Box<dyn Scraper> {
    let session = ScriptedSession {
        page: r#"<div class="row">a</div><div class="row">b</div>"#,
        fail_navigation,
        log: log.clone(),
    };
    let fetcher = DriverFetcher::with_session(Box::new(session), Duration::from_secs(2));
    Box::new(RenderedUnit {
        base: ScraperBase::from_parts(
            name,
            Some(Url::parse("https://careers.example.org/open").unwrap()),
            Fetcher::Driver(fetcher),
        ),
    })
}

#[tokio::test(start_paused = true)]
async fn test_driver_session_quit_once_after_success() {
    let log = SessionLog::default();
    let summary = Runner::new()
        .run(vec![rendered_unit("rendered", false, &log)])
        .await;

    assert!(matches!(
        summary.outcome("rendered"),
        Some(RunOutcome::Success { records: 2, .. })
    ));
    assert_eq!(
        *log.visited.lock().unwrap(),
        vec!["https://careers.example.org/open".to_string()]
    );
    assert_eq!(log.quits.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_navigation_failure_still_quits_session() {
    let log = SessionLog::default();
    let out = TempDir::new().unwrap();
    let after = StubUnit::new("after", None, Behavior::Succeed, out.path());

    let summary = Runner::new()
        .run(vec![rendered_unit("unreachable", true, &log), after.boxed()])
        .await;

    assert_eq!(
        summary.outcome("unreachable").and_then(RunOutcome::error_kind),
        Some(ErrorKind::Transport)
    );
    assert!(summary.outcome("after").unwrap().is_skipped());
    assert_eq!(log.quits.load(Ordering::SeqCst), 1);
}

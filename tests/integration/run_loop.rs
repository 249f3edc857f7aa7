//! End-to-end behaviour of the sequential run loop

use crate::common::{Behavior, CapturedLogs, StubUnit};
use job_scout::{ErrorKind, RunOutcome, Runner};
use std::sync::atomic::Ordering;
use tempfile::TempDir;
use tracing::Level;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JOB_LIST: &str = "<ul><li>Clerk</li><li>Analyst</li></ul>";

async fn job_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(JOB_LIST))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_success_and_skip() {
    let server = job_server().await;
    let out = TempDir::new().unwrap();
    let jobs_url = format!("{}/jobs", server.uri());

    let alpha = StubUnit::new("alpha", Some(&jobs_url), Behavior::Succeed, out.path());
    let beta = StubUnit::new("beta", None, Behavior::Succeed, out.path());
    let (alpha_teardowns, beta_teardowns) = (alpha.teardown_counter(), beta.teardown_counter());

    let summary = Runner::new().run(vec![alpha.boxed(), beta.boxed()]).await;

    assert_eq!(
        summary.to_string(),
        "2 discovered, 1 succeeded, 1 skipped, 0 failed"
    );
    assert!(matches!(
        summary.outcome("alpha"),
        Some(RunOutcome::Success { records: 2, .. })
    ));
    assert!(summary.outcome("beta").unwrap().is_skipped());

    let csv = std::fs::read_to_string(out.path().join("alpha_jobs.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(!out.path().join("beta_jobs.csv").exists());

    assert_eq!(alpha_teardowns.load(Ordering::SeqCst), 1);
    assert_eq!(beta_teardowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_parse_failure_is_isolated() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();

    let server = job_server().await;
    let out = TempDir::new().unwrap();
    let jobs_url = format!("{}/jobs", server.uri());

    let broken = StubUnit::new("broken", Some(&jobs_url), Behavior::ParseError, out.path());
    let healthy = StubUnit::new("healthy", Some(&jobs_url), Behavior::Succeed, out.path());
    let broken_teardowns = broken.teardown_counter();

    let summary = Runner::new().run(vec![broken.boxed(), healthy.boxed()]).await;

    assert_eq!(
        summary.outcome("broken").and_then(RunOutcome::error_kind),
        Some(ErrorKind::Parse)
    );
    assert!(summary.outcome("healthy").unwrap().is_success());
    assert_eq!(broken_teardowns.load(Ordering::SeqCst), 1);

    let errors = logs.matching(Level::ERROR, "broken");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("broken failed (framework error)"));
    assert!(errors[0].message.contains("expected job list not found"));
    assert_eq!(errors[0].field("kind"), Some("parse"));
    assert!(logs.matching(Level::ERROR, "healthy").is_empty());
}

#[tokio::test]
async fn test_http_error_is_classified() {
    let server = job_server().await;
    let out = TempDir::new().unwrap();
    let gone_url = format!("{}/gone", server.uri());

    let unit = StubUnit::new("stale", Some(&gone_url), Behavior::Succeed, out.path());
    let summary = Runner::new().run(vec![unit.boxed()]).await;

    assert_eq!(summary.failed(), 1);
    assert_eq!(
        summary.outcome("stale").and_then(RunOutcome::error_kind),
        Some(ErrorKind::InvalidResponse)
    );
}

#[tokio::test]
async fn test_unexpected_error_is_logged_with_detail() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();

    let server = job_server().await;
    let out = TempDir::new().unwrap();
    let jobs_url = format!("{}/jobs", server.uri());

    let failing = StubUnit::new("quota", Some(&jobs_url), Behavior::UnexpectedSave, out.path());
    let after = StubUnit::new("after", Some(&jobs_url), Behavior::Succeed, out.path());

    let summary = Runner::new().run(vec![failing.boxed(), after.boxed()]).await;

    assert!(matches!(
        summary.outcome("quota"),
        Some(RunOutcome::UnexpectedError { .. })
    ));
    assert!(summary.outcome("after").unwrap().is_success());

    let errors = logs.matching(Level::ERROR, "Unexpected error in quota");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("unexpected"), Some("true"));
    assert!(errors[0].message.contains("disk quota exceeded"));
}

#[tokio::test]
async fn test_panicking_unit_does_not_stop_the_run() {
    let server = job_server().await;
    let out = TempDir::new().unwrap();
    let jobs_url = format!("{}/jobs", server.uri());

    let panicky = StubUnit::new("panicky", Some(&jobs_url), Behavior::PanicInParse, out.path());
    let next = StubUnit::new("next", Some(&jobs_url), Behavior::Succeed, out.path());
    let panicky_teardowns = panicky.teardown_counter();

    let summary = Runner::new().run(vec![panicky.boxed(), next.boxed()]).await;

    match summary.outcome("panicky") {
        Some(RunOutcome::UnexpectedError { error, .. }) => {
            let text = error.to_string();
            assert!(text.contains("stub parser exploded"));
            assert!(text.contains("common.rs"), "panic site missing: {}", text);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(summary.outcome("next").unwrap().is_success());
    assert_eq!(panicky_teardowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_teardown_failure_keeps_outcome() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();

    let server = job_server().await;
    let out = TempDir::new().unwrap();
    let jobs_url = format!("{}/jobs", server.uri());

    let unit = StubUnit::new("sticky", Some(&jobs_url), Behavior::Succeed, out.path())
        .with_failing_teardown();
    let teardowns = unit.teardown_counter();

    let summary = Runner::new().run(vec![unit.boxed()]).await;

    assert!(summary.outcome("sticky").unwrap().is_success());
    assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    assert_eq!(logs.matching(Level::WARN, "Teardown of sticky failed").len(), 1);
}

#[tokio::test]
async fn test_repeated_runs_give_the_same_counts() {
    let server = job_server().await;
    let out = TempDir::new().unwrap();
    let jobs_url = format!("{}/jobs", server.uri());

    let mut summaries = Vec::new();
    for _ in 0..2 {
        let units = vec![
            StubUnit::new("alpha", Some(&jobs_url), Behavior::Succeed, out.path()).boxed(),
            StubUnit::new("beta", None, Behavior::Succeed, out.path()).boxed(),
            StubUnit::new("gamma", Some(&jobs_url), Behavior::ParseError, out.path()).boxed(),
        ];
        summaries.push(Runner::new().run(units).await.to_string());
    }

    assert_eq!(summaries[0], summaries[1]);
    assert_eq!(
        summaries[0],
        "3 discovered, 1 succeeded, 1 skipped, 1 failed"
    );
    let csv = std::fs::read_to_string(out.path().join("alpha_jobs.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test]
async fn test_empty_run() {
    let summary = Runner::new().run(Vec::new()).await;
    assert_eq!(
        summary.to_string(),
        "0 discovered, 0 succeeded, 0 skipped, 0 failed"
    );
}

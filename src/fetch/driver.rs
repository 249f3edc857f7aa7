use crate::driver::{self, BrowserProbe, BrowserSession};
use crate::fetch::RawContent;
use crate::{BuildError, ScrapeError};
use std::time::Duration;

/// Browser-backed fetch strategy
///
/// Holds at most one live session. After navigation it always sleeps the
/// full settle duration before reading the page source; there is no
/// readiness signal.
pub struct DriverFetcher {
    session: Option<Box<dyn BrowserSession>>,
    settle: Duration,
}

impl DriverFetcher {
    /// Acquires a browser session immediately
    ///
    /// Fails with `BuildError::NoBrowser` when the probe finds nothing.
    pub async fn launch(probe: &BrowserProbe, settle: Duration) -> Result<Self, BuildError> {
        let session = driver::launch(probe).await?;
        Ok(Self::with_session(session, settle))
    }

    /// Wraps an already running session
    pub fn with_session(session: Box<dyn BrowserSession>, settle: Duration) -> Self {
        Self {
            session: Some(session),
            settle,
        }
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub async fn fetch(&mut self, url: &str) -> Result<RawContent, ScrapeError> {
        let settle = self.settle;
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| ScrapeError::Driver("browser session already closed".to_string()))?;

        session
            .navigate(url)
            .await
            .map_err(|e| ScrapeError::Driver(format!("{:#}", e)))?;
        tokio::time::sleep(settle).await;

        let source = session
            .page_source()
            .await
            .map_err(|e| ScrapeError::Driver(format!("{:#}", e)))?;
        Ok(RawContent::new(source))
    }

    /// Quits the session and clears the handle
    ///
    /// Calling this without a live session is a no-op.
    pub async fn quit(&mut self) -> anyhow::Result<()> {
        match self.session.take() {
            Some(session) => {
                let family = session.family();
                session.quit().await?;
                tracing::debug!("{} session closed", family);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

//! Headless Chrome session using chromiumoxide.

use super::{BrowserFamily, BrowserSession};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::task::JoinHandle;

/// A running headless Chrome with a single reusable tab
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeSession {
    /// Launches headless Chrome with sandboxing, GPU and browser logging disabled
    pub async fn launch(executable: PathBuf) -> Result<Self> {
        let config = BrowserConfig::builder()
            .chrome_executable(executable)
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-logging")
            .arg("--log-level=3")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chrome")?;

        // The CDP connection only makes progress while its event stream is polled
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(e).context("failed to open a page");
            }
        };

        Ok(Self {
            browser,
            page,
            handler,
        })
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    fn family(&self) -> BrowserFamily {
        BrowserFamily::Chrome
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("navigation to {url} failed"))?;
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        self.page.content().await.context("failed to read page source")
    }

    async fn quit(self: Box<Self>) -> Result<()> {
        let Self {
            mut browser,
            page,
            handler,
        } = *self;

        let _ = page.close().await;
        let closed = browser.close().await.context("failed to close Chrome");
        let _ = browser.wait().await;
        handler.abort();
        closed.map(|_| ())
    }
}

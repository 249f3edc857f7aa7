//! Headless Firefox session driven over the W3C WebDriver protocol.
//!
//! A private `geckodriver` process is spawned per session on a free local
//! port and addressed with plain JSON requests.

use super::{BrowserFamily, BrowserSession};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};

/// Attempts made while waiting for geckodriver to accept connections
const READY_ATTEMPTS: u32 = 50;
const READY_INTERVAL: Duration = Duration::from_millis(100);

/// A running geckodriver with one open Firefox session
pub struct FirefoxSession {
    client: Client,
    endpoint: String,
    session_id: String,
    geckodriver: Child,
}

impl FirefoxSession {
    /// Spawns geckodriver and opens a headless Firefox session
    ///
    /// `firefox` pins the browser binary; when absent geckodriver finds it.
    pub async fn launch(geckodriver: PathBuf, firefox: Option<PathBuf>) -> Result<Self> {
        let port = free_port().context("no free local port for geckodriver")?;
        let endpoint = format!("http://127.0.0.1:{port}");

        let mut child = Command::new(&geckodriver)
            .arg("--port")
            .arg(port.to_string())
            .arg("--log")
            .arg("fatal")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {}", geckodriver.display()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("failed to build WebDriver client")?;

        if let Err(e) = wait_until_ready(&client, &endpoint).await {
            let _ = child.kill().await;
            return Err(e);
        }

        let mut options = json!({ "args": ["-headless"] });
        if let Some(binary) = firefox {
            options["binary"] = json!(binary.to_string_lossy());
        }
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "firefox",
                    "moz:firefoxOptions": options,
                }
            }
        });

        let response = client
            .post(format!("{endpoint}/session"))
            .json(&capabilities)
            .send()
            .await;
        let session_id = match response {
            Ok(response) => match webdriver_value(response).await {
                Ok(value) => value["sessionId"].as_str().map(str::to_string),
                Err(e) => {
                    let _ = child.kill().await;
                    return Err(e.context("geckodriver refused to create a session"));
                }
            },
            Err(e) => {
                let _ = child.kill().await;
                return Err(e).context("failed to reach geckodriver");
            }
        };
        let Some(session_id) = session_id else {
            let _ = child.kill().await;
            bail!("geckodriver returned no session id");
        };

        Ok(Self {
            client,
            endpoint,
            session_id,
            geckodriver: child,
        })
    }

    fn session_url(&self, suffix: &str) -> String {
        format!("{}/session/{}{}", self.endpoint, self.session_id, suffix)
    }
}

#[async_trait]
impl BrowserSession for FirefoxSession {
    fn family(&self) -> BrowserFamily {
        BrowserFamily::Firefox
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        let response = self
            .client
            .post(self.session_url("/url"))
            .json(&json!({ "url": url }))
            .send()
            .await
            .with_context(|| format!("navigation to {url} failed"))?;
        webdriver_value(response).await?;
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        let response = self
            .client
            .get(self.session_url("/source"))
            .send()
            .await
            .context("failed to read page source")?;
        match webdriver_value(response).await? {
            Value::String(source) => Ok(source),
            other => bail!("unexpected page source payload: {other}"),
        }
    }

    async fn quit(self: Box<Self>) -> Result<()> {
        let mut this = *self;
        let deleted = end_session(&this.client, &this.session_url("")).await;
        this.geckodriver
            .kill()
            .await
            .context("failed to stop geckodriver")?;
        deleted.map(|_| ())
    }
}

/// Deletes a WebDriver session; a protocol error status is a failure
async fn end_session(client: &Client, session_url: &str) -> Result<()> {
    let response = client
        .delete(session_url)
        .send()
        .await
        .context("failed to end Firefox session")?;
    webdriver_value(response)
        .await
        .context("geckodriver rejected session shutdown")?;
    Ok(())
}

fn free_port() -> std::io::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

async fn wait_until_ready(client: &Client, endpoint: &str) -> Result<()> {
    for _ in 0..READY_ATTEMPTS {
        if let Ok(response) = client.get(format!("{endpoint}/status")).send().await {
            if response.status().is_success() {
                return Ok(());
            }
        }
        tokio::time::sleep(READY_INTERVAL).await;
    }
    bail!("geckodriver did not become ready at {endpoint}")
}

/// Unwraps the `value` member of a WebDriver response, surfacing protocol errors
async fn webdriver_value(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let mut body: Value = response
        .json()
        .await
        .context("malformed WebDriver response")?;
    let value = body["value"].take();

    if !status.is_success() {
        let error = value["error"].as_str().unwrap_or("unknown error");
        let message = value["message"].as_str().unwrap_or_default();
        bail!("WebDriver {status}: {error}: {message}");
    }
    Ok(value)
}

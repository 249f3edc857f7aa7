//! HTTP fetch strategy
//!
//! Issues a single GET per call with a rotated User-Agent header and a fixed
//! per-request timeout, and classifies failures:
//!
//! | Condition | Error |
//! |-----------|-------|
//! | Non-2xx status | `InvalidResponse` |
//! | Timeout | `Timeout` |
//! | Connection/body failure | `Transport` |

use crate::config::HttpConfig;
use crate::fetch::RawContent;
use crate::ScrapeError;
use rand::seq::SliceRandom;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with the configured timeout
///
/// The User-Agent is set per request so it can rotate.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Stateless HTTP GET strategy
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    user_agents: Vec<String>,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            user_agents: config.user_agents.clone(),
        })
    }

    fn pick_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(crate::text::DEFAULT_USER_AGENT)
    }

    /// Fetches `url` and returns the body as text
    pub async fn fetch(&self, url: &str) -> Result<RawContent, ScrapeError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.pick_user_agent())
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::InvalidResponse {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify(url, e))?;
        tracing::debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(RawContent::new(body))
    }
}

fn classify(url: &str, error: reqwest::Error) -> ScrapeError {
    if error.is_timeout() {
        ScrapeError::Timeout {
            url: url.to_string(),
        }
    } else {
        ScrapeError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}

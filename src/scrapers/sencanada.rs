//! Senate of Canada job postings (VidCruiter hiring platform)
//!
//! The listing page is rendered client-side, so the unit defaults to driver
//! mode. Each posting's detail page is static and fetched over HTTP during
//! parse; labelled fields are pulled out with case-insensitive patterns.

use crate::config::Settings;
use crate::fetch::{HttpFetcher, RawContent};
use crate::output::write_postings;
use crate::scraper::{JobPosting, Scraper, ScraperBase, UnitDefaults};
use crate::text::{build_full_url, clean_text, normalize_date};
use crate::{BuildError, ScrapeError, UnitResult};
use async_trait::async_trait;
use futures::future::BoxFuture;
use regex::{Regex, RegexBuilder};
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::path::PathBuf;
use url::Url;

pub const NAME: &str = "sencanada";

const SOURCE: &str = "senate";
const DEPARTMENT: &str = "Senate of Canada";
const LIST_URL: &str = "https://sencanada.hiringplatform.ca/list/CurrentOpportunities";
const WAIT_SECONDS: u64 = 3;
const LINK_SELECTOR: &str = "h2.vidcruiter-job-item-title a";

/// Detail-page labels, keyed by the field they fill
const FIELD_LABELS: &[(&str, &str)] = &[
    ("directorate", "Directorate"),
    ("classification", "Classification"),
    ("employment_type", "Job Type"),
    ("location", "Location"),
    ("closing_date", "Closing Date"),
];

pub struct SenCanada {
    base: ScraperBase,
    detail: HttpFetcher,
    raw_dir: PathBuf,
    patterns: Vec<(&'static str, Regex)>,
}

/// Registry constructor
pub fn build(settings: &Settings) -> BoxFuture<'_, Result<Box<dyn Scraper>, BuildError>> {
    Box::pin(async move {
        let unit = SenCanada::new(settings).await?;
        Ok(Box::new(unit) as Box<dyn Scraper>)
    })
}

impl SenCanada {
    pub async fn new(settings: &Settings) -> Result<Self, BuildError> {
        let patterns = FIELD_LABELS
            .iter()
            .map(|(field, label)| {
                let pattern = format!(r"{}:\s*</strong>\s*([^<]+)", regex::escape(label));
                RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (*field, re))
                    .map_err(|e| BuildError::Unit {
                        unit: NAME.to_string(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let detail = HttpFetcher::new(&settings.http).map_err(BuildError::HttpClient)?;
        let base = ScraperBase::new(
            NAME,
            settings,
            UnitDefaults::driver(Some(LIST_URL), WAIT_SECONDS),
        )
        .await?;

        Ok(Self {
            base,
            detail,
            raw_dir: PathBuf::from(&settings.output.raw_dir),
            patterns,
        })
    }

    fn extract_fields(&self, html: &str) -> BTreeMap<&'static str, String> {
        self.patterns
            .iter()
            .filter_map(|(field, re)| {
                re.captures(html)
                    .and_then(|caps| caps.get(1))
                    .map(|m| (*field, clean_text(m.as_str())))
                    .filter(|(_, value)| !value.is_empty())
            })
            .collect()
    }
}

/// Title and absolute URL of every posting on the listing page
fn listing_links(html: &str, base: &Url) -> Result<Vec<(String, Url)>, ScrapeError> {
    if html.trim().is_empty() {
        return Err(ScrapeError::Parse("listing page is empty".to_string()));
    }

    let selector = Selector::parse(LINK_SELECTOR)
        .map_err(|e| ScrapeError::Parse(format!("invalid selector: {:?}", e)))?;
    let document = Html::parse_document(html);

    let links = document
        .select(&selector)
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            let url = build_full_url(base, href)?;
            let title = clean_text(&link.text().collect::<String>());
            Some((title, url))
        })
        .collect();
    Ok(links)
}

/// Last path segment of a posting URL, without the query string
fn posting_id(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl Scraper for SenCanada {
    fn base(&self) -> &ScraperBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ScraperBase {
        &mut self.base
    }

    async fn parse(&mut self, raw: RawContent) -> UnitResult<Vec<JobPosting>> {
        let base_url = self
            .base
            .target()
            .cloned()
            .ok_or_else(|| ScrapeError::Parse("no listing URL to resolve links against".into()))?;
        let links = listing_links(raw.as_str(), &base_url)?;
        tracing::debug!("{} listing has {} posting link(s)", NAME, links.len());

        let mut jobs = Vec::with_capacity(links.len());
        for (title, url) in links {
            let detail = match self.detail.fetch(url.as_str()).await {
                Ok(detail) => detail,
                Err(e) => {
                    tracing::warn!("Failed to fetch detail page {}: {}", url, e);
                    continue;
                }
            };

            let mut fields = self.extract_fields(detail.as_str());
            let custom_fields = ["directorate", "classification"]
                .into_iter()
                .filter_map(|key| fields.remove(key).map(|v| (key.to_string(), v)))
                .collect();
            let closing_date = fields
                .remove("closing_date")
                .map(|raw| normalize_date(&raw).unwrap_or(raw));

            jobs.push(JobPosting {
                source: SOURCE.to_string(),
                id: posting_id(&url),
                title,
                department: Some(DEPARTMENT.to_string()),
                location: fields.remove("location"),
                url: url.to_string(),
                employment_type: fields.remove("employment_type"),
                closing_date,
                custom_fields,
                ..JobPosting::default()
            });
        }

        Ok(jobs)
    }

    async fn save(&mut self, records: Vec<JobPosting>) -> UnitResult<usize> {
        write_postings(&self.raw_dir, SOURCE, &records)?;
        Ok(records.len())
    }
}

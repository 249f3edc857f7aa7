//! Minimal static-page unit
//!
//! Serves as a template for new sources. It has no built-in target, so it
//! is skipped unless `[scrapers.example] url` is set.

use crate::config::Settings;
use crate::fetch::RawContent;
use crate::output::write_postings;
use crate::scraper::{JobPosting, Scraper, ScraperBase, UnitDefaults};
use crate::text::{build_full_url, clean_text};
use crate::{BuildError, ScrapeError, UnitResult};
use async_trait::async_trait;
use futures::future::BoxFuture;
use scraper::{ElementRef, Html, Selector};
use std::path::PathBuf;
use url::Url;

pub const NAME: &str = "example";

pub struct Example {
    base: ScraperBase,
    raw_dir: PathBuf,
}

pub fn build(settings: &Settings) -> BoxFuture<'_, Result<Box<dyn Scraper>, BuildError>> {
    Box::pin(async move {
        let base = ScraperBase::new(NAME, settings, UnitDefaults::http(None)).await?;
        Ok(Box::new(Example {
            base,
            raw_dir: PathBuf::from(&settings.output.raw_dir),
        }) as Box<dyn Scraper>)
    })
}

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Parse(format!("invalid selector '{}': {:?}", css, e)))
}

fn first_text(element: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}

/// Extracts one posting per `div.job-post`; a post without a title is a parse error
fn extract_postings(html: &str, page: Option<&Url>) -> Result<Vec<JobPosting>, ScrapeError> {
    let post_sel = selector("div.job-post")?;
    let title_sel = selector("h2")?;
    let company_sel = selector("span.company")?;
    let link_sel = selector("a[href]")?;

    let document = Html::parse_document(html);
    let mut postings = Vec::new();

    for (index, post) in document.select(&post_sel).enumerate() {
        let title = first_text(&post, &title_sel)
            .ok_or_else(|| ScrapeError::Parse(format!("job post #{} has no title", index + 1)))?;

        let url = post
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| page.and_then(|base| build_full_url(base, href)))
            .map(|u| u.to_string())
            .unwrap_or_default();

        let mut posting = JobPosting {
            source: NAME.to_string(),
            id: post
                .value()
                .attr("id")
                .map(str::to_string)
                .unwrap_or_else(|| (index + 1).to_string()),
            title,
            url,
            ..JobPosting::default()
        };
        if let Some(company) = first_text(&post, &company_sel) {
            posting.custom_fields.insert("company".to_string(), company);
        }
        postings.push(posting);
    }

    Ok(postings)
}

#[async_trait]
impl Scraper for Example {
    fn base(&self) -> &ScraperBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ScraperBase {
        &mut self.base
    }

    async fn parse(&mut self, raw: RawContent) -> UnitResult<Vec<JobPosting>> {
        Ok(extract_postings(raw.as_str(), self.base.target())?)
    }

    async fn save(&mut self, records: Vec<JobPosting>) -> UnitResult<usize> {
        write_postings(&self.raw_dir, NAME, &records)?;
        Ok(records.len())
    }
}

//! Output module for persisting parsed postings
//!
//! Each unit writes one CSV file into the raw output area, named after its
//! source. Rows are postings; `custom_fields` is carried as a single JSON
//! column so every file shares the same header.

use crate::scraper::JobPosting;
use crate::ScrapeError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Flat CSV row for a posting
#[derive(Debug, Serialize)]
struct PostingRow<'a> {
    source: &'a str,
    id: &'a str,
    title: &'a str,
    reference: Option<&'a str>,
    department: Option<&'a str>,
    location: Option<&'a str>,
    url: &'a str,
    date_posted: Option<&'a str>,
    date_updated: Option<&'a str>,
    employment_type: Option<&'a str>,
    closing_date: Option<&'a str>,
    custom_fields: String,
}

impl<'a> PostingRow<'a> {
    fn from_posting(posting: &'a JobPosting) -> Result<Self, serde_json::Error> {
        Ok(Self {
            source: &posting.source,
            id: &posting.id,
            title: &posting.title,
            reference: posting.reference.as_deref(),
            department: posting.department.as_deref(),
            location: posting.location.as_deref(),
            url: &posting.url,
            date_posted: posting.date_posted.as_deref(),
            date_updated: posting.date_updated.as_deref(),
            employment_type: posting.employment_type.as_deref(),
            closing_date: posting.closing_date.as_deref(),
            custom_fields: serde_json::to_string(&posting.custom_fields)?,
        })
    }
}

/// Returns the CSV path for a source inside `raw_dir`
pub fn output_path(raw_dir: &Path, source: &str) -> PathBuf {
    raw_dir.join(format!("{}_jobs.csv", source))
}

/// Writes `postings` to `<raw_dir>/<source>_jobs.csv`, replacing any previous file
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(ScrapeError::Save)` - Directory creation or write failed
pub fn write_postings(
    raw_dir: &Path,
    source: &str,
    postings: &[JobPosting],
) -> Result<PathBuf, ScrapeError> {
    let path = output_path(raw_dir, source);
    let save_error = |message: String| ScrapeError::Save {
        path: path.clone(),
        message,
    };

    fs::create_dir_all(raw_dir).map_err(|e| save_error(e.to_string()))?;

    let mut writer = csv::Writer::from_path(&path).map_err(|e| save_error(e.to_string()))?;
    if postings.is_empty() {
        // Header only, so an empty run still leaves a readable file
        writer
            .write_record(HEADER)
            .map_err(|e| save_error(e.to_string()))?;
    }
    for posting in postings {
        let row = PostingRow::from_posting(posting).map_err(|e| save_error(e.to_string()))?;
        writer
            .serialize(row)
            .map_err(|e| save_error(e.to_string()))?;
    }
    writer.flush().map_err(|e| save_error(e.to_string()))?;

    tracing::info!("Saved {} {} posting(s) → {}", postings.len(), source, path.display());
    Ok(path)
}

const HEADER: [&str; 12] = [
    "source",
    "id",
    "title",
    "reference",
    "department",
    "location",
    "url",
    "date_posted",
    "date_updated",
    "employment_type",
    "closing_date",
    "custom_fields",
];

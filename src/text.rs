//! Text and URL helpers shared by scraper units

use chrono::NaiveDate;
use url::Url;

/// Output date format for normalized dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Input formats tried by [`normalize_date`], in order
const INPUT_DATE_FORMATS: &[&str] = &["%B %d, %Y", "%Y-%m-%d", "%d %B %Y", "%b %d, %Y"];

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; JobScout/1.0)";

/// Built-in User-Agent rotation pool
pub const USER_AGENTS: &[&str] = &[
    DEFAULT_USER_AGENT,
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)",
    "Mozilla/5.0 (X11; Linux x86_64)",
];

/// Trims and collapses runs of whitespace to single spaces
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes a human-written date to `YYYY-MM-DD`
///
/// Returns `None` when no known format matches.
pub fn normalize_date(date: &str) -> Option<String> {
    let date = clean_text(date);
    INPUT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&date, fmt).ok())
        .map(|d| d.format(DATE_FORMAT).to_string())
}

/// Resolves `relative` against `base`; absolute links pass through
pub fn build_full_url(base: &Url, relative: &str) -> Option<Url> {
    base.join(relative.trim()).ok()
}

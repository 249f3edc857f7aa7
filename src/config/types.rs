use crate::text::USER_AGENTS;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Main settings structure for Job-Scout
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub http: HttpConfig,
    pub driver: DriverConfig,
    pub output: OutputConfig,

    /// Per-unit overrides keyed by registered unit name
    pub scrapers: BTreeMap<String, UnitSettings>,
}

impl Settings {
    /// Returns the overrides for a unit, or the defaults when none are configured
    pub fn unit(&self, name: &str) -> UnitSettings {
        self.scrapers.get(name).cloned().unwrap_or_default()
    }
}

/// HTTP fetch strategy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// User-Agent strings rotated across requests
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agents: USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Browser driver strategy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Fixed settle time after navigation, in seconds
    #[serde(rename = "wait-seconds")]
    pub wait_seconds: u64,

    /// Executable search path used instead of `PATH` when probing for browsers
    #[serde(rename = "search-path")]
    pub search_path: Option<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            wait_seconds: 3,
            search_path: None,
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one CSV per unit
    #[serde(rename = "raw-dir")]
    pub raw_dir: String,

    /// Directory holding the persistent log file
    #[serde(rename = "logs-dir")]
    pub logs_dir: String,

    /// Log file name inside `logs_dir`
    #[serde(rename = "log-file")]
    pub log_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_dir: "data/raw".to_string(),
            logs_dir: "logs".to_string(),
            log_file: "scraper_run.log".to_string(),
        }
    }
}

/// Per-unit overrides from a `[scrapers.<name>]` table
///
/// Values are kept as written; they are interpreted when the unit is
/// constructed so a bad entry only excludes that unit.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UnitSettings {
    pub enabled: bool,

    /// Target URL, replacing the unit's built-in one
    pub url: Option<String>,

    #[serde(rename = "fetch-mode")]
    pub fetch_mode: Option<String>,

    #[serde(rename = "wait-seconds")]
    pub wait_seconds: Option<u64>,
}

impl Default for UnitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            url: None,
            fetch_mode: None,
            wait_seconds: None,
        }
    }
}

//! Configuration module for Job-Scout
//!
//! This module handles loading, parsing, and validating the TOML settings
//! document. Settings are read once at process start and passed by
//! reference to the registry, the unit constructors and the run loop.
//!
//! # Example
//!
//! ```no_run
//! use job_scout::config::load_config;
//! use std::path::Path;
//!
//! let settings = load_config(Path::new("config/settings.toml")).unwrap();
//! println!("HTTP timeout: {}s", settings.http.timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

/// Longest settle wait accepted for driver-mode fetches, in seconds
pub const MAX_WAIT_SECONDS: u64 = 120;

// Re-export types
pub use types::{DriverConfig, HttpConfig, OutputConfig, Settings, UnitSettings};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

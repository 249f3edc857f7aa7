use crate::config::types::{DriverConfig, HttpConfig, OutputConfig, Settings};
use crate::config::MAX_WAIT_SECONDS;
use crate::ConfigError;

/// Validates the process-wide settings
///
/// Per-unit tables are left alone; their values are checked when the unit
/// is constructed.
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    validate_http_config(&settings.http)?;
    validate_driver_config(&settings.driver)?;
    validate_output_config(&settings.output)?;
    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "http.timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "http.user-agents cannot be empty".to_string(),
        ));
    }

    if let Some(blank) = config.user_agents.iter().position(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "http.user-agents[{}] is blank",
            blank
        )));
    }

    Ok(())
}

fn validate_driver_config(config: &DriverConfig) -> Result<(), ConfigError> {
    if config.wait_seconds > MAX_WAIT_SECONDS {
        return Err(ConfigError::Validation(format!(
            "driver.wait-seconds must be <= {}, got {}",
            MAX_WAIT_SECONDS, config.wait_seconds
        )));
    }
    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (key, value) in [
        ("output.raw-dir", &config.raw_dir),
        ("output.logs-dir", &config.logs_dir),
        ("output.log-file", &config.log_file),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
        }
    }
    Ok(())
}

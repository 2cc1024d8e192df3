//! Configuration validation

use crate::{AuditorConfig, ConfigError, LoggingSection, Result, WardenConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];
const LOG_FORMATS: &[&str] = &["json", "pretty", "compact"];
const LOG_OUTPUTS: &[&str] = &["stdout", "stderr"];

/// Validate a complete configuration
pub fn validate_config(config: &WardenConfig) -> Result<()> {
    validate_auditor(&config.auditor)?;
    validate_logging(&config.logging)?;
    Ok(())
}

/// Validate auditor settings
pub fn validate_auditor(config: &AuditorConfig) -> Result<()> {
    if config.devices.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "devices root must not be empty".to_string(),
        ));
    }

    if config.datadir.is_empty() {
        return Err(invalid("datadir", "must not be empty"));
    }
    if config.datadir.contains(std::path::is_separator) {
        return Err(invalid("datadir", "must be a single directory name"));
    }

    if config.db_suffix.is_empty() {
        return Err(invalid("db_suffix", "must not be empty"));
    }

    Ok(())
}

/// Validate logging settings
pub fn validate_logging(config: &LoggingSection) -> Result<()> {
    if !LOG_LEVELS.contains(&config.level.to_lowercase().as_str()) {
        return Err(invalid("logging.level", &format!("unknown level '{}'", config.level)));
    }
    if !LOG_FORMATS.contains(&config.format.to_lowercase().as_str()) {
        return Err(invalid("logging.format", &format!("unknown format '{}'", config.format)));
    }
    if !LOG_OUTPUTS.contains(&config.output.to_lowercase().as_str()) {
        return Err(invalid("logging.output", &format!("unknown output '{}'", config.output)));
    }
    Ok(())
}

impl WardenConfig {
    /// Validate this configuration
    pub fn validate(&self) -> Result<()> {
        validate_config(self)
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

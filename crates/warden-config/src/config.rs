//! Configuration types and loading

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::{ConfigError, Result};

/// Strings accepted as "true" for boolean flags
pub const TRUE_VALUES: &[&str] = &["true", "t", "1", "on", "yes", "y"];

/// Check whether a configuration string is one of the accepted true values
pub fn config_true_value(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    TRUE_VALUES.contains(&value.as_str())
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Replica auditor settings
    pub auditor: AuditorConfig,

    /// Logging settings
    pub logging: LoggingSection,
}

/// Settings for the replica auditor daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditorConfig {
    /// Directory holding one subdirectory per local device
    pub devices: PathBuf,

    /// Skip devices that are not mount points
    #[serde(deserialize_with = "deserialize_flag")]
    pub mount_check: bool,

    /// Minimum seconds between the starts of two full passes
    pub interval: u64,

    /// Name of the data directory inside each device
    pub datadir: String,

    /// File suffix identifying replica databases
    pub db_suffix: String,

    /// Optional JSON file receiving per-pass statistics
    pub recon_cache_path: Option<PathBuf>,
}

impl Default for AuditorConfig {
    fn default() -> Self {
        Self {
            devices: PathBuf::from("/srv/node"),
            mount_check: true,
            interval: 1800,
            datadir: "containers".to_string(),
            db_suffix: ".db".to_string(),
            recon_cache_path: None,
        }
    }
}

impl AuditorConfig {
    /// Pass interval as a duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// Data directory of a device under the devices root
    pub fn device_datadir(&self, device: impl AsRef<Path>) -> PathBuf {
        self.devices.join(device).join(&self.datadir)
    }
}

/// Logging section of the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Minimum level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (json, pretty, compact)
    pub format: String,

    /// Stream to log to when no file is set (stdout, stderr)
    pub output: String,

    /// Optional log file; overrides `output`
    pub file: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            output: "stdout".to_string(),
            file: None,
        }
    }
}

impl WardenConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `WARDEN_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(devices) = lookup("WARDEN_DEVICES") {
            self.auditor.devices = PathBuf::from(devices);
        }
        if let Some(mount_check) = lookup("WARDEN_MOUNT_CHECK") {
            self.auditor.mount_check = config_true_value(&mount_check);
        }
        if let Some(interval) = lookup("WARDEN_INTERVAL") {
            self.auditor.interval = interval.trim().parse().map_err(|_| {
                ConfigError::EnvVar(format!("WARDEN_INTERVAL is not a number of seconds: {interval}"))
            })?;
        }
        if let Some(datadir) = lookup("WARDEN_DATADIR") {
            self.auditor.datadir = datadir;
        }
        if let Some(level) = lookup("WARDEN_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value == 1,
        Flag::Text(value) => config_true_value(&value),
    })
}

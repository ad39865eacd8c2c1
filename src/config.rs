//! Configuration management for Porssisahko
//!
//! This module handles loading, validation, and management of the daemon
//! configuration from YAML files. The transfer fee itself lives in the config
//! entry (see [`crate::persistence`]); the YAML only carries its install-time
//! value.

use crate::error::{PorssisahkoError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

pub use defaults::DEFAULT_API_URL;

/// Environment variable that points at an explicit config file
pub const CONFIG_PATH_ENV: &str = "PORSSISAHKO_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Price API connection settings
    pub api: ApiConfig,

    /// Seconds between two price refreshes
    pub poll_interval_seconds: u64,

    /// Seconds to wait before retrying a setup that was not ready
    pub setup_retry_seconds: u64,

    /// Transfer fee (currency per kWh) used when the entry is first created
    pub transfer_fee: f64,

    /// Create the entry from `transfer_fee` on first start instead of
    /// waiting for the install dialog
    pub auto_install: bool,

    /// Timezone used when rendering timestamps
    pub timezone: String,

    /// Path of the persisted config entry
    pub entry_file: String,

    /// Presentation of the exposed price sensor
    pub sensor: SensorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Web server binding configuration
    pub web: WebConfig,
}

/// Price API connection parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ApiConfig {
    /// Endpoint returning the latest prices
    pub url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

/// Sensor presentation
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SensorConfig {
    /// Friendly name
    pub name: String,

    /// Unit of the exposed value
    pub unit_of_measurement: String,

    /// Device class hint for consumers
    pub device_class: String,

    /// State class hint for consumers
    pub state_class: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional override for the console layer
    pub console_level: Option<String>,

    /// Optional override for the file layer
    pub file_level: Option<String>,

    /// Path to log file (its directory receives the rolling files)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WebConfig {
    /// Whether to serve the HTTP API at all
    pub enabled: bool,

    /// Bind address
    pub host: String,

    /// TCP port
    pub port: u16,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from `PORSSISAHKO_CONFIG` or the default locations
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Self::from_file(path);
        }

        let default_paths = [
            "porssisahko.yaml",
            "/data/porssisahko.yaml",
            "/etc/porssisahko/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Self::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parsed timezone; callers are expected to have validated the config
    pub fn tz(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or(chrono_tz::UTC)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.url.trim().is_empty() {
            return Err(PorssisahkoError::validation(
                "api.url",
                "URL cannot be empty",
            ));
        }

        if self.api.timeout_seconds == 0 {
            return Err(PorssisahkoError::validation(
                "api.timeout_seconds",
                "Must be greater than 0",
            ));
        }

        if self.poll_interval_seconds == 0 {
            return Err(PorssisahkoError::validation(
                "poll_interval_seconds",
                "Must be greater than 0",
            ));
        }

        if self.setup_retry_seconds == 0 {
            return Err(PorssisahkoError::validation(
                "setup_retry_seconds",
                "Must be greater than 0",
            ));
        }

        if !self.transfer_fee.is_finite() {
            return Err(PorssisahkoError::validation(
                "transfer_fee",
                "Must be a finite number",
            ));
        }

        if self.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(PorssisahkoError::validation(
                "timezone",
                format!("Unknown timezone '{}'", self.timezone),
            ));
        }

        if self.entry_file.trim().is_empty() {
            return Err(PorssisahkoError::validation(
                "entry_file",
                "Path cannot be empty",
            ));
        }

        if self.web.enabled && self.web.port == 0 {
            return Err(PorssisahkoError::validation(
                "web.port",
                "Port must be greater than 0",
            ));
        }

        Ok(())
    }
}

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

// ─── Configuration ───────────────────────────────────────────────

/// Everything the monitor needs to know, loaded once at startup.
///
/// Every field has a compiled-in default, so an empty TOML file (or no
/// file at all) yields the stock GigaCorp setup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Statistics endpoint polled every cycle
    #[serde(default = "default_url")]
    pub url: String,

    /// Pause between two cycles (seconds)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Upper bound on a single GET including the body read (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Failed cycles in a row before "unreachable" is printed
    #[serde(default = "default_max_failures")]
    pub max_consecutive_failures: u32,

    #[serde(default)]
    pub thresholds: Thresholds,
}

/// Trigger levels. Each check fires only when strictly exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    /// Raw load average
    #[serde(default = "default_load_average")]
    pub load_average: f64,

    /// used / total memory ratio
    #[serde(default = "default_memory_usage")]
    pub memory_usage: f64,

    /// used / total disk ratio
    #[serde(default = "default_disk_usage")]
    pub disk_usage: f64,

    /// used / total bandwidth ratio
    #[serde(default = "default_network_usage")]
    pub network_usage: f64,
}

fn default_url() -> String {
    "http://srv.msk01.gigacorp.local/_stats".into()
}
fn default_interval_secs() -> u64 {
    5
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_max_failures() -> u32 {
    3
}
fn default_load_average() -> f64 {
    30.0
}
fn default_memory_usage() -> f64 {
    0.8
}
fn default_disk_usage() -> f64 {
    0.9
}
fn default_network_usage() -> f64 {
    0.9
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            load_average: default_load_average(),
            memory_usage: default_memory_usage(),
            disk_usage: default_disk_usage(),
            network_usage: default_network_usage(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
            max_consecutive_failures: default_max_failures(),
            thresholds: Thresholds::default(),
        }
    }
}

// ─── Loading ─────────────────────────────────────────────────────

/// Command-line values that win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub interval_secs: Option<u64>,
}

impl MonitorConfig {
    /// Defaults, then `file` if given, then `overrides`; validated.
    pub fn resolve(file: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(url) = overrides.url {
            config.url = url;
        }
        if let Some(secs) = overrides.interval_secs {
            config.interval_secs = secs;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys fall back to defaults.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read and parse a TOML file. Does not validate.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Reject settings the loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::Invalid("url must not be empty".into()));
        }
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid("interval_secs must be at least 1".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be at least 1".into()));
        }
        if self.max_consecutive_failures == 0 {
            return Err(ConfigError::Invalid(
                "max_consecutive_failures must be at least 1".into(),
            ));
        }
        self.thresholds.validate()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Thresholds {
    fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("load_average", self.load_average),
            ("memory_usage", self.memory_usage),
            ("disk_usage", self.disk_usage),
            ("network_usage", self.network_usage),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "thresholds.{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

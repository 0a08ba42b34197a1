use std::path::PathBuf;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Why a single poll cycle failed.
///
/// The monitor treats every variant the same way (one more step on the
/// failure streak); the variant only feeds the diagnostic log.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("expected 7 fields, got {0}")]
    FieldCount(usize),

    #[error("field {index} is not a number: {token:?}")]
    InvalidNumber { index: usize, token: String },

    #[error("{0} total is zero")]
    ZeroTotal(&'static str),
}

/// Startup-time configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("cannot build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

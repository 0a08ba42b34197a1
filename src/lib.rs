//! Polls a host's `_stats` endpoint and prints a warning line whenever
//! load, memory, disk or bandwidth usage crosses its threshold, or when
//! the endpoint keeps failing.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod monitor;
pub mod sample;
pub mod source;
pub mod thresholds;

pub use config::{MonitorConfig, Thresholds};
pub use error::{ConfigError, CycleError};
pub use monitor::{CycleOutcome, Monitor, MonitorSettings};
pub use sample::Sample;
pub use source::{HttpStatsSource, StatsSource};
pub use thresholds::Warning;

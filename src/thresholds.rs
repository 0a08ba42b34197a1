use std::fmt;

use crate::config::Thresholds;
use crate::sample::Sample;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BITS_PER_MBIT: f64 = 1000.0 * 1000.0;

/// A single line printed to the warning stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Warning {
    LoadHigh { load_average: f64 },
    /// Whole percent, floored
    MemoryHigh { percent: f64 },
    /// Binary megabytes, floored
    DiskLow { free_mb: f64 },
    /// Decimal megabits per second, floored
    NetworkHigh { free_mbit: f64 },
    Unreachable,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadHigh { load_average } => {
                write!(f, "Load Average is too high: {load_average}")
            }
            Self::MemoryHigh { percent } => write!(f, "Memory usage too high: {percent:.0}%"),
            Self::DiskLow { free_mb } => {
                write!(f, "Free disk space is too low: {free_mb:.0} Mb left")
            }
            Self::NetworkHigh { free_mbit } => {
                write!(f, "Network bandwidth usage high: {free_mbit:.0} Mbit/s available")
            }
            Self::Unreachable => f.write_str("Unable to fetch server statistic."),
        }
    }
}

/// Run the four checks against one sample. Checks are independent and
/// always reported in the order load, memory, disk, network.
pub fn evaluate(sample: &Sample, limits: &Thresholds) -> Vec<Warning> {
    let mut warnings = Vec::with_capacity(4);

    if sample.load_average > limits.load_average {
        warnings.push(Warning::LoadHigh {
            load_average: sample.load_average,
        });
    }

    let mem = sample.memory_ratio();
    if mem > limits.memory_usage {
        warnings.push(Warning::MemoryHigh {
            percent: (mem * 100.0).floor(),
        });
    }

    if sample.disk_ratio() > limits.disk_usage {
        warnings.push(Warning::DiskLow {
            free_mb: ((sample.disk_total - sample.disk_used) / BYTES_PER_MB).floor(),
        });
    }

    if sample.network_ratio() > limits.network_usage {
        warnings.push(Warning::NetworkHigh {
            free_mbit: ((sample.net_total - sample.net_used) / BITS_PER_MBIT).floor(),
        });
    }

    warnings
}

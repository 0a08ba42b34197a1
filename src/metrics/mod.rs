pub mod collector;

pub use collector::{LatencySummary, Quantiles, RunStats, RunSummary};

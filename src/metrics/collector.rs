use std::fmt;
use std::time::{Duration, Instant};

use hdrhistogram::Histogram;

// ─── Configuration ───────────────────────────────────────────────

/// HdrHistogram range: 1 μs → 10 min, 3 significant figures
const HIST_LOW: u64 = 1;
const HIST_HIGH: u64 = 600_000_000;
const HIST_SIGFIG: u8 = 3;

// ─── Public types ────────────────────────────────────────────────

/// In-memory bookkeeping for one monitor run.
///
/// Nothing here feeds back into threshold evaluation; it only backs the
/// summary logged on shutdown.
pub struct RunStats {
    fetch_latency: Histogram<u64>,
    cycles: u64,
    successes: u64,
    failures: u64,
    warnings: u64,
    longest_streak: u32,
    start_time: Instant,
}

/// Read-only view of a run, produced by `RunStats::summary`.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub cycles: u64,
    pub successes: u64,
    pub failures: u64,
    pub warnings: u64,
    pub longest_streak: u32,
    pub elapsed: Duration,
    pub fetch_latency: LatencySummary,
}

/// Fetch latency quantiles in microseconds. `None` before the first fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary(pub Option<Quantiles>);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantiles {
    pub min: u64,
    pub p50: u64,
    pub p95: u64,
    pub max: u64,
    pub count: u64,
}

impl LatencySummary {
    fn of(hist: &Histogram<u64>) -> Self {
        Self((!hist.is_empty()).then(|| Quantiles {
            min: hist.min(),
            p50: hist.value_at_quantile(0.5),
            p95: hist.value_at_quantile(0.95),
            max: hist.max(),
            count: hist.len(),
        }))
    }

    pub fn count(&self) -> u64 {
        self.0.map_or(0, |q| q.count)
    }
}

impl fmt::Display for LatencySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => f.write_str("no fetches"),
            Some(q) => write!(
                f,
                "p50={}μs p95={}μs max={}μs (n={})",
                q.p50, q.p95, q.max, q.count
            ),
        }
    }
}

// ─── RunStats impl ───────────────────────────────────────────────

impl RunStats {
    pub fn new() -> Self {
        Self {
            fetch_latency: Histogram::<u64>::new_with_bounds(HIST_LOW, HIST_HIGH, HIST_SIGFIG)
                .expect("histogram creation"),
            cycles: 0,
            successes: 0,
            failures: 0,
            warnings: 0,
            longest_streak: 0,
            start_time: Instant::now(),
        }
    }

    /// Record how long a fetch took, whatever its outcome.
    pub fn record_fetch(&mut self, elapsed: Duration) {
        let us = (elapsed.as_micros() as u64).clamp(HIST_LOW, HIST_HIGH);
        let _ = self.fetch_latency.record(us);
    }

    pub fn record_success(&mut self, warnings: usize) {
        self.cycles += 1;
        self.successes += 1;
        self.warnings += warnings as u64;
    }

    /// `streak` is the failure streak after this cycle was counted.
    pub fn record_failure(&mut self, streak: u32, warned: bool) {
        self.cycles += 1;
        self.failures += 1;
        self.longest_streak = self.longest_streak.max(streak);
        if warned {
            self.warnings += 1;
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            cycles: self.cycles,
            successes: self.successes,
            failures: self.failures,
            warnings: self.warnings,
            longest_streak: self.longest_streak,
            elapsed: self.start_time.elapsed(),
            fetch_latency: LatencySummary::of(&self.fetch_latency),
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

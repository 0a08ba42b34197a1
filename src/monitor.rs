use std::io::Write;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::config::{MonitorConfig, Thresholds};
use crate::error::CycleError;
use crate::metrics::RunStats;
use crate::sample::Sample;
use crate::source::StatsSource;
use crate::thresholds::{self, Warning};

/// Loop parameters, detached from the on-disk config so tests can use
/// sub-second intervals.
#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    pub interval: Duration,
    pub max_consecutive_failures: u32,
    pub thresholds: Thresholds,
}

impl From<&MonitorConfig> for MonitorSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            max_consecutive_failures: config.max_consecutive_failures,
            thresholds: config.thresholds,
        }
    }
}

/// What a single cycle ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Success { warnings: Vec<Warning> },
    Failure { streak: u32, unreachable: bool },
}

/// The polling loop and the only mutable state it carries.
pub struct Monitor<S, W> {
    source: S,
    out: W,
    settings: MonitorSettings,
    failure_streak: u32,
    stats: RunStats,
}

impl<S: StatsSource, W: Write> Monitor<S, W> {
    pub fn new(source: S, settings: MonitorSettings, out: W) -> Self {
        Self {
            source,
            out,
            settings,
            failure_streak: 0,
            stats: RunStats::new(),
        }
    }

    pub fn failure_streak(&self) -> u32 {
        self.failure_streak
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Poll, sleep, repeat until `shutdown` fires.
    ///
    /// Cancellation is checked before each cycle and interrupts the sleep;
    /// a fetch already in flight finishes or times out first.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        tracing::info!(
            interval = ?self.settings.interval,
            max_failures = self.settings.max_consecutive_failures,
            "monitor loop started"
        );

        while !shutdown.is_cancelled() {
            self.run_cycle().await;

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }

        tracing::info!("monitor loop stopped");
    }

    /// One fetch → parse → evaluate pass. Never sleeps.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let started = Instant::now();
        let fetched = self.source.fetch().await;
        let latency = started.elapsed();
        self.stats.record_fetch(latency);

        match fetched.and_then(|body| Sample::parse(&body)) {
            Ok(sample) => {
                self.failure_streak = 0;
                let warnings = thresholds::evaluate(&sample, &self.settings.thresholds);
                tracing::debug!(
                    latency_us = latency.as_micros() as u64,
                    warnings = warnings.len(),
                    "poll cycle ok"
                );
                for warning in &warnings {
                    self.emit(warning);
                }
                self.stats.record_success(warnings.len());
                CycleOutcome::Success { warnings }
            }
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: CycleError) -> CycleOutcome {
        self.failure_streak = self.failure_streak.saturating_add(1);
        let streak = self.failure_streak;
        tracing::warn!(error = %err, streak, "poll cycle failed");

        let unreachable = streak >= self.settings.max_consecutive_failures;
        if unreachable {
            self.emit(&Warning::Unreachable);
        }
        self.stats.record_failure(streak, unreachable);
        CycleOutcome::Failure {
            streak,
            unreachable,
        }
    }

    fn emit(&mut self, warning: &Warning) {
        let written = writeln!(self.out, "{warning}").and_then(|()| self.out.flush());
        if let Err(e) = written {
            tracing::error!(error = %e, line = %warning, "cannot write warning");
        }
    }
}

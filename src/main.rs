use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use statwatch::config::Overrides;
use statwatch::{logging, HttpStatsSource, Monitor, MonitorConfig, MonitorSettings};

/// Watch a server's statistics endpoint and warn about resource pressure.
#[derive(Debug, Parser)]
#[command(name = "statwatch", version)]
struct Cli {
    /// TOML file overriding the built-in defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Statistics URL (overrides the config file)
    #[arg(long)]
    url: Option<String>,

    /// Seconds between polls (overrides the config file)
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Log level used when STATWATCH_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    // ── 1. Resolve configuration ─────────────────────────────────
    let config = MonitorConfig::resolve(
        cli.config.as_deref(),
        Overrides {
            url: cli.url,
            interval_secs: cli.interval_secs,
        },
    )?;

    // ── 2. Build the HTTP source ─────────────────────────────────
    let source = HttpStatsSource::from_config(&config).context("setting up stats source")?;
    tracing::info!(url = source.url(), timeout_secs = config.timeout_secs, "polling");

    // ── 3. Ctrl-C → graceful stop ────────────────────────────────
    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for Ctrl-C");
            return;
        }
        tracing::info!("Ctrl-C received, stopping");
        on_signal.cancel();
    });

    // ── 4. Run until stopped ─────────────────────────────────────
    let mut monitor = Monitor::new(source, MonitorSettings::from(&config), std::io::stdout());
    monitor.run(shutdown).await;

    let summary = monitor.stats().summary();
    tracing::info!(
        cycles = summary.cycles,
        successes = summary.successes,
        failures = summary.failures,
        warnings = summary.warnings,
        longest_streak = summary.longest_streak,
        elapsed = ?summary.elapsed,
        "fetch latency: {}",
        summary.fetch_latency
    );

    Ok(())
}

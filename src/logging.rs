use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable consulted before the `--log-level` fallback.
pub const LOG_ENV: &str = "STATWATCH_LOG";

/// Install the global subscriber.
///
/// Diagnostics always go to stderr; stdout is reserved for warning lines.
/// `STATWATCH_LOG` (EnvFilter syntax) wins over `default_level`.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    Registry::default().with(filter).with(stderr).init();
}

//! Structured logging.
//!
//! Uses the `tracing` crate. The configured level is a default; `RUST_LOG`
//! overrides it when set.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter directive for a configured level.
pub fn filter_directive(log_level: &str) -> String {
    format!("nft_scout={level},scout_cli={level},warn", level = log_level)
}

/// Initialize the global tracing subscriber. Call once, from `main`.
pub fn init_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter_directive(log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

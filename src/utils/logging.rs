// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber for crawl progress output.
/// `RUST_LOG` overrides the level, e.g. `RUST_LOG=opportunity_crawler=debug`
/// to see per-selector extraction traces; otherwise `info` is used.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("Logging setup complete.");
}

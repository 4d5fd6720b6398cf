//! Logging setup for the garden session server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise both the library crate
/// and the named binary log at `default_level`.
pub fn setup_logger(binary_name: &str, default_level: &str) {
    let fallback = [env!("CARGO_PKG_NAME"), binary_name]
        .map(|target| format!("{}={}", target.replace('-', "_"), default_level))
        .join(",");
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

//! Logging setup utilities for the overlay backend.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Both the server library crate and the binary log at `default_log_level`
/// unless `RUST_LOG` overrides it.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "butai-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use butai_shared::logger::setup_logger;
///
/// setup_logger("butai-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the filter directive used when `RUST_LOG` is not set.
fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "butai_server={level},butai_shared={level},{bin}={level},tower_http={level}",
        level = default_log_level,
        bin = binary_name.replace('-', "_"),
    )
}

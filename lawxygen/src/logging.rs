//! Tracing setup for the `lawxygen` CLI.
//!
//! Diagnostics go to stderr and are controlled by `RUST_LOG`; they are never
//! part of the rendered page or the CLI's stdout.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used by the CLI when `RUST_LOG` is unset.
pub const CLI_DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber: `RUST_LOG` if set, else `default_filter`.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=lawxygen=debug cargo run -p lawxygen -- render
/// ```
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

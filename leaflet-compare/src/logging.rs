//! Log output setup for hosts.
//!
//! The library only emits `tracing` events. Hosts without their own
//! subscriber can call [`init_logging`] to print them.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "leaflet_compare=info";

/// Install a formatted subscriber filtered by `RUST_LOG`, or `default_filter`.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_logging(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

// ABOUTME: Tracing subscriber setup
// ABOUTME: Compact fmt output filtered through RUST_LOG

use memberdesk_config::constants::RUST_LOG;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber, filtered by `RUST_LOG` (default `info`).
///
/// Later calls are no-ops, so tests and binaries may both call this.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(RUST_LOG).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

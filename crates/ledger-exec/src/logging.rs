//! Console logging setup.
//!
//! The accounting core only emits `tracing` events; wiring them to a
//! subscriber is the embedder's job. This helper covers binaries and tests
//! that want console output with `RUST_LOG` filtering.

use tracing_subscriber::EnvFilter;

/// Initialize console logging, preferring `RUST_LOG` over `default_level`.
/// Safe to call repeatedly; only the first call installs a subscriber.
pub fn init_logging(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

//! Tracing subscriber setup for host applications.
//!
//! The engine itself only emits `tracing` events; installing a subscriber is
//! the host's job. This helper wires up the standard fmt subscriber with an
//! `RUST_LOG`-style filter for hosts that don't need anything fancier.

use tracing_subscriber::EnvFilter;

/// Installs a fmt tracing subscriber filtered by `RUST_LOG`, defaulting to
/// `info`. Call once, as early as possible; a second call is a no-op.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

// src/observability.rs
//! Tracing initialization
//!
//! Operator diagnostics (worker lifecycle, read errors, reclamation) go
//! through `tracing`, strictly separate from the data log. Filtering follows
//! `RUST_LOG`, defaulting to `info`.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// Safe to call more than once; later calls keep the existing subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

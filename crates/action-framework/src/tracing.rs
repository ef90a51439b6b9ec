//! # Observability & Tracing
//!
//! Structured logging for the action layer uses the `tracing` crate. Actions
//! are wrapped in `#[instrument]` spans, log their payload once at `debug` on
//! entry, and log the outcome at `info` (success) or `warn` (translated failure).
//!
//! ```bash
//! RUST_LOG=info cargo run      # Compact logs
//! RUST_LOG=debug cargo run     # Payloads, per-call warnings, upload progress
//! ```
//!
//! Output uses the compact format without module targets, so span names
//! (`create_buildpack`, `describe`) carry the context:
//!
//! ```text
//! INFO create_buildpack: Buildpack created name="demo-bp" guid="bp-1"
//! DEBUG upload_buildpack: Upload progress percent=50 bytes=512 total=1024
//! WARN describe: Describe failed error=App ghost not found
//! ```

use tracing_subscriber::EnvFilter;

/// Initializes the subscriber from `RUST_LOG`, defaulting to `info`.
pub fn setup_tracing() {
    setup_tracing_with("info");
}

/// Initializes the subscriber from `RUST_LOG`, falling back to `default_filter`
/// when the variable is unset or invalid.
///
/// Safe to call more than once; later calls are ignored.
pub fn setup_tracing_with(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

//! # Observability & Tracing
//!
//! Structured logging for order tracking, built on `tracing`.
//!
//! ## What Gets Traced
//!
//! - **Tracker lifecycle**: start, `NotFound`, terminal status, stop
//! - **Fetches**: each issued fetch at `debug`, failures at `warn`
//! - **Transitions**: every status change at `debug`, raised notifications at `info`
//! - **Kitchen actor**: order creation and status updates
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run      # Lifecycle and notifications
//! RUST_LOG=debug cargo run     # Every fetch, tick and transition
//! RUST_LOG=order_tracker=debug,kitchen_sample=info cargo run
//! ```

/// Initializes the tracing subscriber for the whole application.
///
/// Filtering is controlled by `RUST_LOG`. Calling this twice is harmless: the
/// second call leaves the first subscriber in place.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}

//! Diagnostic tracing for sentinel.
//!
//! Stdout carries the rendered pipeline report; all tracing output goes to
//! stderr so the two never interleave in redirected output.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `warn` if unset. Targets are omitted since
/// every event comes from this crate.
///
/// # Example
/// ```bash
/// RUST_LOG=sentinel=debug sentinel create "a login form"
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

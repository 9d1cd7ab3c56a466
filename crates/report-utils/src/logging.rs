//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Initialize tracing, falling back to `default_directives` when `RUST_LOG` is unset.
pub fn init_tracing_with_default(default_directives: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directives)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

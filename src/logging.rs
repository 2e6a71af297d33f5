//! Logging initialization and configuration.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "floatterm=info";

fn filter_for(level: Option<&str>) -> EnvFilter {
    match level {
        Some(level) if !level.is_empty() => {
            // Bare levels apply to this crate only; full directives pass through.
            let directive = if level.contains('=') || level.contains(',') {
                level.to_string()
            } else {
                format!("floatterm={}", level)
            };
            EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
        }
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Initialize the logging system.
///
/// Uses the `RUST_LOG` environment variable for filtering. If not set,
/// defaults to `floatterm=info`. Output goes to stderr.
///
/// # Panics
///
/// Panics if another tracing subscriber has already been set.
pub fn init() {
    tracing_subscriber::registry()
        .with(filter_for(None))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Try to initialize the logging system with an explicit level or directive.
///
/// Falls back to `RUST_LOG` when `level` is `None`. Returns `Err` if logging
/// has already been initialized.
pub fn try_init_with(level: Option<&str>) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(filter_for(level))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init()
}

/// Try to initialize the logging system from the environment.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    try_init_with(None)
}

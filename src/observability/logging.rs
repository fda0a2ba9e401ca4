//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Pick the log filter from the environment, else from config
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - Our crate and tower_http share the configured level by default

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default directive for a configured level, e.g. `info`.
pub fn default_directive(level: &str) -> String {
    format!("request_filter={level},tower_http={level}")
}

/// Install the global subscriber. Returns an error if one is already set.
pub fn init_logging(level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

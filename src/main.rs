//! Request Filter Server
//!
//! Serves a small application behind a configurable filter pipeline.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ filter middleware ──▶ pipeline
//!                                                            │
//!                        ┌───────────────────────────────────┘
//!                        ▼
//!                  mapping table (URL / servlet name / dispatch phase)
//!                        │
//!                        ▼
//!                  filters in mapping order
//!                   ├─ failed_request   (400 on unparseable parameters)
//!                   └─ csrf_prevention  (nonce check, nonce issue)
//!                        │
//!                        ▼
//!     Client Response ◀── handler (URLs encoded with the issued nonce)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use request_filter::config::{load_config, FilterServerConfig};
use request_filter::http::{shutdown_signal, FilterServer};
use request_filter::observability::{logging, metrics};

#[derive(Debug, Parser)]
#[command(name = "request-filter", version, about = "Filter pipeline server with CSRF prevention")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "filters.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, missing) = if cli.config.exists() {
        (load_config(&cli.config)?, false)
    } else {
        (FilterServerConfig::default(), true)
    };

    logging::init_logging(&config.observability.log_level)?;
    tracing::info!("request-filter v{} starting", env!("CARGO_PKG_VERSION"));
    if missing {
        tracing::warn!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        filters = config.filters.len(),
        mappings = config.mappings.len(),
        request_timeout_secs = config.limits.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses when metrics are on.
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = FilterServer::new(config)?;
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

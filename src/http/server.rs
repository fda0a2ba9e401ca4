//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the filter pipeline from configuration
//! - Wrap the application router in the filter middleware
//! - Wire up ambient layers (tracing, request timeout, body limit)
//! - Serve on a bound listener until shutdown
//! - Purge idle sessions in the background while serving

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::FilterServerConfig;
use crate::http::handlers::demo_routes;
use crate::http::middleware::{filter_middleware, FilterState};
use crate::pipeline::{build_pipeline, FilterPipeline, PipelineError};
use crate::session::{sweep_expired, InMemorySessionStore, SessionStore};

/// HTTP server running an application behind the filter pipeline.
pub struct FilterServer {
    router: Router,
    pipeline: Arc<FilterPipeline>,
    sessions: Arc<dyn SessionStore>,
    config: FilterServerConfig,
}

impl FilterServer {
    /// Serve the demo application with an in-memory session store.
    pub fn new(config: FilterServerConfig) -> Result<Self, PipelineError> {
        let idle_timeout = Duration::from_secs(config.session.idle_timeout_secs);
        let sessions: Arc<dyn SessionStore> =
            Arc::new(InMemorySessionStore::with_idle_timeout(idle_timeout));
        Self::with_app(config, demo_routes(sessions.clone()), sessions)
    }

    /// Serve `app` behind the pipeline described by `config`.
    pub fn with_app(
        config: FilterServerConfig,
        app: Router,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, PipelineError> {
        let pipeline = Arc::new(build_pipeline(&config, sessions.clone())?);
        let state = FilterState {
            pipeline: pipeline.clone(),
            sessions: sessions.clone(),
            cookie_name: config.session.cookie_name.as_str().into(),
            max_body_size: config.limits.max_body_size,
            max_parameters: config.limits.max_parameters,
        };
        let router = Self::build_router(&config, app, state);
        Ok(Self {
            router,
            pipeline,
            sessions,
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &FilterServerConfig, app: Router, state: FilterState) -> Router {
        app.layer(middleware::from_fn_with_state(state, filter_middleware))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.limits.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for serving or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn pipeline(&self) -> &FilterPipeline {
        &self.pipeline
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Run the server until `shutdown` completes.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            filters = self.pipeline.filter_count(),
            mappings = self.pipeline.mappings().len(),
            "HTTP server starting"
        );

        let sweeper = tokio::spawn(sweep_expired(
            self.sessions.clone(),
            Duration::from_secs(self.config.session.sweep_interval_secs),
        ));

        let served = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await;
        sweeper.abort();
        served?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &FilterServerConfig {
        &self.config
    }
}

/// Wait for shutdown signal (Ctrl+C).
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

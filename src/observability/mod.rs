//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Filters and pipeline produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters per filter, decision and status)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (filter, path, reason) on every rejection
//! - Counters are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;

//! Request filter dispatch with nonce-based CSRF prevention.

pub mod config;
pub mod csrf;
pub mod http;
pub mod mapping;
pub mod observability;
pub mod pipeline;
pub mod session;

pub use config::schema::FilterServerConfig;
pub use csrf::CsrfGuard;
pub use http::FilterServer;
pub use mapping::{DispatchPhase, DispatchTypes, FilterMapping, MappingTable};
pub use pipeline::{ChainOutcome, Filter, FilterPipeline};

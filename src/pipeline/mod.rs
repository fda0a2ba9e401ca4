//! Request filter pipeline.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     FilterDef[] → registry.rs (instantiate by kind, typed params)
//!     MappingDef[] → mapping table (registration order)
//!     → chain.rs FilterPipeline (frozen, shared via Arc)
//!
//! Per request:
//!     FilterRequest (method, path, params, phase, session)
//!     → chain.rs (resolve servlet name, resolve filter names)
//!     → filter.rs Filter::do_filter for each, in order
//!     → Proceed (response possibly wrapped) | Halted (status, reason)
//! ```
//!
//! # Design Decisions
//! - The pipeline owns no per-request state
//! - A rejection ends the chain; nothing after it runs
//! - Response wrapping is a stack of URL rewriters, applied innermost first

pub mod chain;
pub mod failed_request;
pub mod filter;
pub mod registry;

pub use chain::{ChainOutcome, FilterPipeline, PipelineBuilder, PipelineError, Rejection};
pub use failed_request::FailedRequestFilter;
pub use filter::{Filter, FilterOutcome, FilterRequest, FilterResponse, UrlEncoder, UrlRewriter};
pub use registry::build_pipeline;

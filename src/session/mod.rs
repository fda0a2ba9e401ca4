//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Cookie header (session handle)
//!     → http/request.rs (extract SessionId)
//!     → store.rs (attribute lookup by handle + key)
//!     → filters read or create their per-session state
//!
//! Session created by a filter:
//!     → store.rs create()
//!     → http/middleware.rs (Set-Cookie on the way out)
//! ```
//!
//! # Design Decisions
//! - Sessions are opaque key-value bags; filters own their attribute keys
//! - Storage is pluggable behind `SessionStore`
//! - In-memory sessions expire after an idle timeout; a background task purges them

pub mod store;

pub use store::{sweep_expired, Attribute, InMemorySessionStore, SessionId, SessionStore, DEFAULT_IDLE_TIMEOUT};

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, ambient layers)
//!     → middleware.rs (describe request, run filter pipeline)
//!         ├─ halted  → status + reason, handler never runs
//!         └─ proceed → UrlEncoder + SessionId extensions
//!     → handlers.rs (application, encodes its URLs)
//!     → Set-Cookie for sessions created by filters
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;

pub use middleware::{filter_middleware, FilterState};
pub use server::{shutdown_signal, FilterServer};

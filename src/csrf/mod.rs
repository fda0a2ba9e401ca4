//! CSRF prevention subsystem.
//!
//! # Data Flow
//! ```text
//! Request matched to the CSRF filter:
//!     → guard.rs (entry point? else session → nonce cache → submitted nonce)
//!     → Rejected: deny status, chain stops
//!     → Entry / Accepted:
//!         nonce.rs (16 random bytes → 32 hex chars)
//!         cache.rs (add to session's bounded cache, evict oldest)
//!         rewrite.rs (wrap response: encode_url / encode_redirect_url)
//! ```
//!
//! # Design Decisions
//! - A new nonce is issued on every request that passes
//! - The newest `nonce_cache_size` nonces of a session stay valid
//! - Random source is chosen by name at startup; unknown names abort startup

pub mod cache;
pub mod config;
pub mod guard;
pub mod nonce;
pub mod rewrite;

pub use cache::{NonceCache, DEFAULT_NONCE_CACHE_SIZE};
pub use config::{CsrfConfig, DEFAULT_NONCE_PARAMETER, MAX_NONCE_CACHE_SIZE};
pub use guard::{CsrfDecision, CsrfGuard, RejectReason, NONCE_CACHE_ATTRIBUTE};
pub use nonce::{random_source, NonceToken, RandomSource};
pub use rewrite::{append_nonce, NonceRewriter};

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FilterServerConfig (validated, immutable)
//!     → pipeline registry builds filters from FilterDef
//!         → params.rs (typed init parameters, strict / lenient)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Unknown filter parameters: strict filters fail, others warn

pub mod loader;
pub mod params;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::FilterServerConfig;
pub use schema::{FilterDef, FilterKind, MappingDef, ServletDef};
pub use schema::{LimitsConfig, ListenerConfig, ObservabilityConfig, SessionConfig};

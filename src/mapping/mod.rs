//! Filter mapping subsystem.
//!
//! # Data Flow
//! ```text
//! Mapping definitions (config or builder)
//!     → filter_map.rs (validate patterns, fold dispatchers into a set)
//!     → table.rs (append in registration order, freeze)
//!
//! Per request (path, servlet name, dispatch phase):
//!     → table.rs (scan mappings in order)
//!     → dispatch.rs (phase membership)
//!     → pattern.rs (exact / prefix / extension)
//!     → Return: ordered filter names
//! ```
//!
//! # Design Decisions
//! - Mappings are validated once at registration, never at lookup
//! - First registered, first invoked
//! - Servlet-name resolution reuses the same pattern rules

pub mod dispatch;
pub mod filter_map;
pub mod pattern;
pub mod servlet;
pub mod table;

pub use dispatch::{DispatchPhase, DispatchTypes};
pub use filter_map::{FilterMapping, FilterMappingBuilder, MappingError};
pub use pattern::{PatternError, UrlPattern};
pub use servlet::ServletMap;
pub use table::MappingTable;

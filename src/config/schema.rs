//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the filter
//! server. All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FilterServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Request size and time limits.
    pub limits: LimitsConfig,

    /// Session handle transport.
    pub session: SessionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Filter definitions, by unique name.
    pub filters: Vec<FilterDef>,

    /// Filter mappings, in invocation order.
    pub mappings: Vec<MappingDef>,

    /// Named handlers and the URL patterns they serve.
    pub servlets: Vec<ServletDef>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum form body size read for parameters, in bytes.
    pub max_body_size: usize,

    /// Requests with more parameters than this fail parameter parsing.
    pub max_parameters: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            max_body_size: 2 * 1024 * 1024, // 2MB
            max_parameters: 1000,
        }
    }
}

/// Session cookie settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session handle.
    pub cookie_name: String,

    /// Sessions untouched for this long are discarded.
    pub idle_timeout_secs: u64,

    /// How often expired sessions are purged.
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "SESSIONID".to_string(),
            idle_timeout_secs: 30 * 60,
            sweep_interval_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Built-in filter implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    CsrfPrevention,
    FailedRequest,
}

impl FilterKind {
    /// Whether unknown parameters are fatal when `strict` is not set.
    pub fn strict_by_default(self) -> bool {
        match self {
            FilterKind::CsrfPrevention => true,
            FilterKind::FailedRequest => false,
        }
    }
}

/// A named filter instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterDef {
    /// Unique filter name referenced by mappings.
    pub name: String,

    pub kind: FilterKind,

    /// Fail on unknown parameters instead of warning.
    #[serde(default)]
    pub strict: Option<bool>,

    /// Init parameters, interpreted by the filter kind.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl FilterDef {
    pub fn is_strict(&self) -> bool {
        self.strict.unwrap_or_else(|| self.kind.strict_by_default())
    }
}

/// Associates a filter with URL patterns and/or servlet names.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MappingDef {
    /// Name of a defined filter.
    pub filter: String,

    /// `"*"` matches every URL.
    #[serde(default)]
    pub url_patterns: Vec<String>,

    /// `"*"` matches every servlet.
    #[serde(default)]
    pub servlet_names: Vec<String>,

    /// REQUEST, FORWARD, INCLUDE, ERROR (case-insensitive). Empty means REQUEST.
    #[serde(default)]
    pub dispatchers: Vec<String>,
}

/// A named handler mounted on URL patterns.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServletDef {
    pub name: String,

    pub url_patterns: Vec<String>,
}

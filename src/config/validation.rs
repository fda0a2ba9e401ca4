//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (mappings reference defined filters)
//! - Validate URL patterns, dispatcher names and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FilterServerConfig → Result<(), Vec<ValidationError>>
//! - Filter init parameters are checked when the filter is built, not here

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::{FilterServerConfig, MappingDef};
use crate::mapping::{DispatchPhase, FilterMapping, MappingError, UrlPattern};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid {field} '{value}'")]
    Address { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("session cookie name must not be empty")]
    EmptyCookieName,

    #[error("filter '{0}' is defined more than once")]
    DuplicateFilter(String),

    #[error("filter definition has an empty name")]
    EmptyFilterName,

    #[error("mapping #{index} references undefined filter '{filter}'")]
    UndefinedFilter { index: usize, filter: String },

    #[error("mapping #{index}: {source}")]
    Mapping { index: usize, source: MappingError },

    #[error("mapping #{index}: unknown dispatcher '{value}'")]
    Dispatcher { index: usize, value: String },

    #[error("servlet '{name}': invalid URL pattern '{pattern}'")]
    ServletPattern { name: String, pattern: String },
}

/// Build a mapping from its definition.
pub fn build_mapping(def: &MappingDef) -> Result<FilterMapping, MappingBuildError> {
    let mut builder = FilterMapping::builder(def.filter.as_str())
        .url_patterns(def.url_patterns.iter().cloned())
        .servlet_names(def.servlet_names.iter().cloned());
    for raw in &def.dispatchers {
        let phase: DispatchPhase = raw
            .parse()
            .map_err(|_| MappingBuildError::Dispatcher(raw.clone()))?;
        builder = builder.dispatcher(phase);
    }
    builder.build().map_err(MappingBuildError::Mapping)
}

/// Failure turning a `MappingDef` into a `FilterMapping`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingBuildError {
    #[error(transparent)]
    Mapping(MappingError),

    #[error("unknown dispatcher '{0}'")]
    Dispatcher(String),
}

pub fn validate_config(config: &FilterServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::Address {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if config.limits.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "limits.request_timeout_secs" });
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::Zero { field: "limits.max_body_size" });
    }
    if config.limits.max_parameters == 0 {
        errors.push(ValidationError::Zero { field: "limits.max_parameters" });
    }
    if config.session.idle_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "session.idle_timeout_secs" });
    }
    if config.session.sweep_interval_secs == 0 {
        errors.push(ValidationError::Zero { field: "session.sweep_interval_secs" });
    }
    if config.session.cookie_name.trim().is_empty() {
        errors.push(ValidationError::EmptyCookieName);
    }

    let mut names = HashSet::new();
    for filter in &config.filters {
        if filter.name.trim().is_empty() {
            errors.push(ValidationError::EmptyFilterName);
        } else if !names.insert(filter.name.as_str()) {
            errors.push(ValidationError::DuplicateFilter(filter.name.clone()));
        }
    }

    for (index, def) in config.mappings.iter().enumerate() {
        match build_mapping(def) {
            Ok(mapping) if !names.contains(mapping.filter_name()) => {
                errors.push(ValidationError::UndefinedFilter {
                    index,
                    filter: mapping.filter_name().to_string(),
                });
            }
            Ok(_) => {}
            Err(MappingBuildError::Mapping(source)) => {
                errors.push(ValidationError::Mapping { index, source });
            }
            Err(MappingBuildError::Dispatcher(value)) => {
                errors.push(ValidationError::Dispatcher { index, value });
            }
        }
    }

    for servlet in &config.servlets {
        for pattern in &servlet.url_patterns {
            if pattern != "/" && UrlPattern::parse(pattern).is_err() {
                errors.push(ValidationError::ServletPattern {
                    name: servlet.name.clone(),
                    pattern: pattern.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

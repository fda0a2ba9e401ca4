//! Typed reading of per-filter init parameters.
//!
//! # Design Decisions
//! - Every key must be consumed by the filter's config type
//! - Keys left over are an error for strict filters and a warning otherwise
//! - Values stay strings in the file; each filter parses what it needs

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::csrf::nonce::UnknownRandomSource;

/// Errors raised while turning init parameters into a filter config.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterConfigError {
    #[error("filter '{filter}': unknown parameter '{key}'")]
    UnknownParameter { filter: String, key: String },

    #[error("filter '{filter}': invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        filter: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("filter '{filter}': {source}")]
    RandomSource {
        filter: String,
        #[source]
        source: UnknownRandomSource,
    },
}

/// Cursor over one filter's parameters that tracks which keys were read.
#[derive(Debug)]
pub struct FilterParams<'a> {
    filter: &'a str,
    params: &'a BTreeMap<String, String>,
    strict: bool,
    consumed: BTreeSet<&'a str>,
}

impl<'a> FilterParams<'a> {
    pub fn new(filter: &'a str, params: &'a BTreeMap<String, String>, strict: bool) -> Self {
        Self {
            filter,
            params,
            strict,
            consumed: BTreeSet::new(),
        }
    }

    pub fn filter(&self) -> &'a str {
        self.filter
    }

    pub fn string(&mut self, key: &'a str) -> Option<&'a str> {
        let value = self.params.get(key)?;
        self.consumed.insert(key);
        Some(value.as_str())
    }

    pub fn parse<T>(&mut self, key: &'a str) -> Result<Option<T>, FilterConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(raw) = self.string(key) else {
            return Ok(None);
        };
        raw.trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| self.invalid(key, raw, e.to_string()))
    }

    pub fn invalid(&self, key: &str, value: &str, reason: impl Into<String>) -> FilterConfigError {
        FilterConfigError::InvalidValue {
            filter: self.filter.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Report keys nobody consumed.
    pub fn finish(self) -> Result<(), FilterConfigError> {
        for key in self.params.keys() {
            if self.consumed.contains(key.as_str()) {
                continue;
            }
            if self.strict {
                return Err(FilterConfigError::UnknownParameter {
                    filter: self.filter.to_string(),
                    key: key.clone(),
                });
            }
            tracing::warn!(filter = %self.filter, key = %key, "Ignoring unknown filter parameter");
        }
        Ok(())
    }
}

//! CSRF guard configuration.

use std::collections::HashSet;

use axum::http::StatusCode;

use crate::config::params::{FilterConfigError, FilterParams};
use crate::csrf::cache::DEFAULT_NONCE_CACHE_SIZE;
use crate::csrf::nonce::DEFAULT_RANDOM_SOURCE;

/// Default name of the request parameter carrying the nonce.
pub const DEFAULT_NONCE_PARAMETER: &str = "csrfToken";

/// Largest accepted `nonce_cache_size`.
pub const MAX_NONCE_CACHE_SIZE: usize = 1024;

/// Init parameter keys understood by the CSRF guard.
pub mod keys {
    pub const ENTRY_POINTS: &str = "entry_points";
    pub const NONCE_CACHE_SIZE: &str = "nonce_cache_size";
    pub const RANDOM_SOURCE: &str = "random_source";
    pub const NONCE_REQUEST_PARAMETER: &str = "nonce_request_parameter";
    pub const DENY_STATUS: &str = "deny_status";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfConfig {
    /// Paths reachable by GET without a nonce.
    pub entry_points: HashSet<String>,
    pub nonce_cache_size: usize,
    /// Name of the random source; resolved when the guard is built.
    pub random_source: String,
    pub nonce_parameter: String,
    pub deny_status: StatusCode,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            entry_points: HashSet::new(),
            nonce_cache_size: DEFAULT_NONCE_CACHE_SIZE,
            random_source: DEFAULT_RANDOM_SOURCE.to_string(),
            nonce_parameter: DEFAULT_NONCE_PARAMETER.to_string(),
            deny_status: StatusCode::FORBIDDEN,
        }
    }
}

impl CsrfConfig {
    /// Replace the entry points with a comma-separated list.
    pub fn with_entry_points(mut self, list: &str) -> Self {
        self.entry_points = parse_entry_points(list);
        self
    }

    pub fn with_nonce_cache_size(mut self, size: usize) -> Self {
        self.nonce_cache_size = size;
        self
    }

    pub fn with_random_source(mut self, name: impl Into<String>) -> Self {
        self.random_source = name.into();
        self
    }

    pub fn with_nonce_parameter(mut self, name: impl Into<String>) -> Self {
        self.nonce_parameter = name.into();
        self
    }

    pub fn from_params(mut params: FilterParams<'_>) -> Result<Self, FilterConfigError> {
        let mut config = CsrfConfig::default();

        if let Some(list) = params.string(keys::ENTRY_POINTS) {
            config.entry_points = parse_entry_points(list);
        }

        if let Some(size) = params.parse::<usize>(keys::NONCE_CACHE_SIZE)? {
            if size == 0 {
                return Err(params.invalid(keys::NONCE_CACHE_SIZE, "0", "must be at least 1"));
            }
            if size > MAX_NONCE_CACHE_SIZE {
                return Err(params.invalid(
                    keys::NONCE_CACHE_SIZE,
                    &size.to_string(),
                    format!("must be at most {MAX_NONCE_CACHE_SIZE}"),
                ));
            }
            config.nonce_cache_size = size;
        }

        if let Some(name) = params.string(keys::RANDOM_SOURCE) {
            config.random_source = name.trim().to_string();
        }

        if let Some(name) = params.string(keys::NONCE_REQUEST_PARAMETER) {
            let name = name.trim();
            if name.is_empty() {
                return Err(params.invalid(keys::NONCE_REQUEST_PARAMETER, name, "must not be empty"));
            }
            config.nonce_parameter = name.to_string();
        }

        if let Some(code) = params.parse::<u16>(keys::DENY_STATUS)? {
            config.deny_status = StatusCode::from_u16(code)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .ok_or_else(|| {
                    params.invalid(keys::DENY_STATUS, &code.to_string(), "must be a 4xx or 5xx status")
                })?;
        }

        params.finish()?;
        Ok(config)
    }
}

fn parse_entry_points(list: &str) -> HashSet<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let p = params(&[]);
        let config = CsrfConfig::from_params(FilterParams::new("csrf", &p, true)).unwrap();
        assert_eq!(config, CsrfConfig::default());
        assert_eq!(config.nonce_cache_size, 5);
        assert_eq!(config.deny_status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_entry_points_are_trimmed() {
        let p = params(&[(keys::ENTRY_POINTS, " /index , /login,, ")]);
        let config = CsrfConfig::from_params(FilterParams::new("csrf", &p, true)).unwrap();
        let expected: HashSet<String> = ["/index", "/login"].into_iter().map(String::from).collect();
        assert_eq!(config.entry_points, expected);
    }

    #[test]
    fn test_all_keys() {
        let p = params(&[
            (keys::NONCE_CACHE_SIZE, "8"),
            (keys::RANDOM_SOURCE, "thread"),
            (keys::NONCE_REQUEST_PARAMETER, "_nonce"),
            (keys::DENY_STATUS, "400"),
        ]);
        let config = CsrfConfig::from_params(FilterParams::new("csrf", &p, true)).unwrap();
        assert_eq!(config.nonce_cache_size, 8);
        assert_eq!(config.random_source, "thread");
        assert_eq!(config.nonce_parameter, "_nonce");
        assert_eq!(config.deny_status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            (keys::NONCE_CACHE_SIZE, "0"),
            (keys::NONCE_CACHE_SIZE, "-1"),
            (keys::NONCE_CACHE_SIZE, "1025"),
            (keys::NONCE_CACHE_SIZE, "18446744073709551615"),
            (keys::DENY_STATUS, "200"),
            (keys::DENY_STATUS, "99"),
            (keys::NONCE_REQUEST_PARAMETER, "  "),
        ] {
            let p = params(&[(key, value)]);
            let err = CsrfConfig::from_params(FilterParams::new("csrf", &p, false)).unwrap_err();
            assert!(matches!(err, FilterConfigError::InvalidValue { .. }), "{key}={value}");
        }
    }

    #[test]
    fn test_cache_size_upper_bound() {
        let max = MAX_NONCE_CACHE_SIZE.to_string();
        let p = params(&[(keys::NONCE_CACHE_SIZE, max.as_str())]);
        let config = CsrfConfig::from_params(FilterParams::new("csrf", &p, true)).unwrap();
        assert_eq!(config.nonce_cache_size, MAX_NONCE_CACHE_SIZE);

        let huge = usize::MAX.to_string();
        let p = params(&[(keys::NONCE_CACHE_SIZE, huge.as_str())]);
        let err = CsrfConfig::from_params(FilterParams::new("csrf", &p, true)).unwrap_err();
        assert!(matches!(err, FilterConfigError::InvalidValue { ref value, .. } if *value == huge));
    }

    #[test]
    fn test_unknown_key_when_strict() {
        let p = params(&[("entryPoints", "/x")]);
        assert!(matches!(
            CsrfConfig::from_params(FilterParams::new("csrf", &p, true)),
            Err(FilterConfigError::UnknownParameter { .. })
        ));
        assert!(CsrfConfig::from_params(FilterParams::new("csrf", &p, false)).is_ok());
    }
}

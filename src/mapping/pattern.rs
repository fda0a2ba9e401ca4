//! URL pattern parsing and matching.
//!
//! # Responsibilities
//! - Validate URL patterns at registration time
//! - Match a context-relative request path against a pattern
//!
//! # Design Decisions
//! - Three pattern shapes: exact (`/a/b`), path prefix (`/a/*`), extension (`*.do`)
//! - `"*"` is not a pattern; mappings turn it into a match-all flag
//! - Matching is case-sensitive and never allocates

use std::fmt;

/// Reasons a URL pattern is refused at registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("URL pattern must not be empty")]
    Empty,

    #[error("URL pattern '{0}' contains a line break")]
    LineBreak(String),

    #[error("URL pattern '{0}' must start with '/' or '*.'")]
    BadStart(String),

    #[error("URL pattern '{0}' has a wildcard outside a trailing '/*'")]
    MisplacedWildcard(String),

    #[error("extension pattern '{0}' must name a non-empty extension without '/'")]
    BadExtension(String),
}

/// A validated URL pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    /// Matches one path exactly.
    Exact(String),
    /// `/stem/*`; stores the stem without the trailing `/*`. `/*` has an empty stem.
    Prefix(String),
    /// `*.ext`; stores the extension without the leading `*.`.
    Extension(String),
}

impl UrlPattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if raw.is_empty() {
            return Err(PatternError::Empty);
        }
        if raw.contains(['\n', '\r']) {
            return Err(PatternError::LineBreak(raw.to_string()));
        }

        if let Some(ext) = raw.strip_prefix("*.") {
            if ext.is_empty() || ext.contains(['/', '*']) {
                return Err(PatternError::BadExtension(raw.to_string()));
            }
            return Ok(UrlPattern::Extension(ext.to_string()));
        }

        if !raw.starts_with('/') {
            return Err(PatternError::BadStart(raw.to_string()));
        }

        if let Some(stem) = raw.strip_suffix("/*") {
            if stem.contains('*') {
                return Err(PatternError::MisplacedWildcard(raw.to_string()));
            }
            return Ok(UrlPattern::Prefix(stem.to_string()));
        }

        if raw.contains('*') {
            return Err(PatternError::MisplacedWildcard(raw.to_string()));
        }
        Ok(UrlPattern::Exact(raw.to_string()))
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            UrlPattern::Exact(p) => p == path,
            UrlPattern::Prefix(stem) => match path.strip_prefix(stem.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
            UrlPattern::Extension(ext) => {
                let Some(slash) = path.rfind('/') else {
                    return false;
                };
                match path.rfind('.') {
                    Some(period) if period > slash => &path[period + 1..] == ext,
                    _ => false,
                }
            }
        }
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlPattern::Exact(p) => f.write_str(p),
            UrlPattern::Prefix(stem) => write!(f, "{}/*", stem),
            UrlPattern::Extension(ext) => write!(f, "*.{}", ext),
        }
    }
}

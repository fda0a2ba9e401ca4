//! A single filter mapping.

use crate::mapping::dispatch::{DispatchPhase, DispatchTypes};
use crate::mapping::pattern::{PatternError, UrlPattern};

/// Token that turns on the match-all flag for either dimension.
pub const MATCH_ALL: &str = "*";

/// Errors raised while building a mapping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("filter mapping has an empty filter name")]
    EmptyFilterName,

    #[error("mapping for filter '{0}' has neither URL patterns nor servlet names")]
    NoMatchRule(String),

    #[error("mapping for filter '{filter}' has an empty servlet name")]
    EmptyServletName { filter: String },

    #[error("mapping for filter '{filter}': {source}")]
    Pattern {
        filter: String,
        #[source]
        source: PatternError,
    },
}

/// Associates a filter name with the requests it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterMapping {
    filter_name: String,
    url_patterns: Vec<UrlPattern>,
    servlet_names: Vec<String>,
    match_all_urls: bool,
    match_all_servlets: bool,
    dispatch_types: DispatchTypes,
}

impl FilterMapping {
    pub fn builder(filter_name: impl Into<String>) -> FilterMappingBuilder {
        FilterMappingBuilder {
            filter_name: filter_name.into(),
            url_patterns: Vec::new(),
            servlet_names: Vec::new(),
            dispatchers: Vec::new(),
        }
    }

    pub fn filter_name(&self) -> &str {
        &self.filter_name
    }

    pub fn url_patterns(&self) -> &[UrlPattern] {
        &self.url_patterns
    }

    pub fn servlet_names(&self) -> &[String] {
        &self.servlet_names
    }

    pub fn match_all_urls(&self) -> bool {
        self.match_all_urls
    }

    pub fn match_all_servlets(&self) -> bool {
        self.match_all_servlets
    }

    /// The stored value, which may still be unset.
    pub fn dispatch_types(&self) -> DispatchTypes {
        self.dispatch_types
    }

    /// True when either the path or the servlet name dimension matches.
    pub fn matches_target(&self, path: &str, servlet_name: Option<&str>) -> bool {
        self.matches_url(path) || self.matches_servlet(servlet_name)
    }

    fn matches_url(&self, path: &str) -> bool {
        self.match_all_urls || self.url_patterns.iter().any(|p| p.matches(path))
    }

    fn matches_servlet(&self, servlet_name: Option<&str>) -> bool {
        let Some(name) = servlet_name else {
            return false;
        };
        self.match_all_servlets || self.servlet_names.iter().any(|s| s == name)
    }

    pub fn matches(&self, path: &str, servlet_name: Option<&str>, phase: DispatchPhase) -> bool {
        self.dispatch_types.contains(phase) && self.matches_target(path, servlet_name)
    }
}

/// Collects raw mapping rules and validates them on `build`.
#[derive(Debug, Clone)]
pub struct FilterMappingBuilder {
    filter_name: String,
    url_patterns: Vec<String>,
    servlet_names: Vec<String>,
    dispatchers: Vec<DispatchPhase>,
}

impl FilterMappingBuilder {
    pub fn url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.url_patterns.push(pattern.into());
        self
    }

    pub fn url_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.url_patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn servlet_name(mut self, name: impl Into<String>) -> Self {
        self.servlet_names.push(name.into());
        self
    }

    pub fn servlet_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.servlet_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn dispatcher(mut self, phase: DispatchPhase) -> Self {
        self.dispatchers.push(phase);
        self
    }

    pub fn build(self) -> Result<FilterMapping, MappingError> {
        let filter_name = self.filter_name.trim().to_string();
        if filter_name.is_empty() {
            return Err(MappingError::EmptyFilterName);
        }
        if self.url_patterns.is_empty() && self.servlet_names.is_empty() {
            return Err(MappingError::NoMatchRule(filter_name));
        }

        let mut match_all_urls = false;
        let mut url_patterns = Vec::with_capacity(self.url_patterns.len());
        for raw in &self.url_patterns {
            if raw == MATCH_ALL {
                match_all_urls = true;
                continue;
            }
            let pattern = UrlPattern::parse(raw).map_err(|source| MappingError::Pattern {
                filter: filter_name.clone(),
                source,
            })?;
            url_patterns.push(pattern);
        }

        let mut match_all_servlets = false;
        let mut servlet_names = Vec::with_capacity(self.servlet_names.len());
        for name in self.servlet_names {
            if name == MATCH_ALL {
                match_all_servlets = true;
            } else if name.is_empty() {
                return Err(MappingError::EmptyServletName { filter: filter_name });
            } else {
                servlet_names.push(name);
            }
        }

        Ok(FilterMapping {
            filter_name,
            url_patterns,
            servlet_names,
            match_all_urls,
            match_all_servlets,
            dispatch_types: self.dispatchers.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_sets_flag_instead_of_pattern() {
        let m = FilterMapping::builder("csrf").url_pattern("*").build().unwrap();
        assert!(m.match_all_urls());
        assert!(m.url_patterns().is_empty());
        assert!(m.matches("/any/thing", None, DispatchPhase::Request));

        let m = FilterMapping::builder("csrf").servlet_name("*").build().unwrap();
        assert!(m.match_all_servlets());
        assert!(m.matches("/x", Some("default"), DispatchPhase::Request));
        assert!(!m.matches("/x", None, DispatchPhase::Request));
    }

    #[test]
    fn test_requires_a_match_rule() {
        assert_eq!(
            FilterMapping::builder("csrf").build(),
            Err(MappingError::NoMatchRule("csrf".into()))
        );
        assert_eq!(
            FilterMapping::builder("  ").url_pattern("/*").build(),
            Err(MappingError::EmptyFilterName)
        );
    }

    #[test]
    fn test_bad_pattern_rejected_at_build() {
        let err = FilterMapping::builder("csrf").url_pattern("").build().unwrap_err();
        assert!(matches!(err, MappingError::Pattern { source: PatternError::Empty, .. }));
    }

    #[test]
    fn test_either_dimension_matches() {
        let m = FilterMapping::builder("audit")
            .url_pattern("/api/*")
            .servlet_name("upload")
            .build()
            .unwrap();
        assert!(m.matches("/api/v1", Some("other"), DispatchPhase::Request));
        assert!(m.matches("/files", Some("upload"), DispatchPhase::Request));
        assert!(!m.matches("/files", Some("other"), DispatchPhase::Request));
    }

    #[test]
    fn test_dispatch_membership() {
        let m = FilterMapping::builder("errors")
            .url_pattern("/*")
            .dispatcher(DispatchPhase::Error)
            .dispatcher(DispatchPhase::Forward)
            .build()
            .unwrap();
        assert!(m.matches("/x", None, DispatchPhase::Error));
        assert!(m.matches("/x", None, DispatchPhase::Forward));
        assert!(!m.matches("/x", None, DispatchPhase::Request));

        let default = FilterMapping::builder("plain").url_pattern("/*").build().unwrap();
        assert!(default.dispatch_types().is_unset());
        assert!(default.matches("/x", None, DispatchPhase::Request));
        assert!(!default.matches("/x", None, DispatchPhase::Include));
    }
}

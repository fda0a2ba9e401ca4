//! Servlet-name lookup for request paths.
//!
//! # Responsibilities
//! - Store the URL patterns each named servlet (handler) is mounted on
//! - Resolve the servlet name serving a path
//!
//! # Design Decisions
//! - Precedence: exact, then longest prefix, then extension, then default (`/`)
//! - Ties at the same precedence go to the first registered servlet
//! - Explicit `None` when nothing serves the path

use crate::mapping::pattern::{PatternError, UrlPattern};

/// Pattern that marks a servlet as the default one.
const DEFAULT_SERVLET_PATTERN: &str = "/";

#[derive(Debug, Clone)]
struct ServletEntry {
    name: String,
    patterns: Vec<UrlPattern>,
}

/// Named handlers and the URL patterns they are mounted on.
#[derive(Debug, Clone, Default)]
pub struct ServletMap {
    entries: Vec<ServletEntry>,
    default_servlet: Option<String>,
}

impl ServletMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<I, S>(&mut self, name: impl Into<String>, patterns: I) -> Result<(), PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.into();
        let mut parsed = Vec::new();
        for raw in patterns {
            let raw = raw.as_ref();
            if raw == DEFAULT_SERVLET_PATTERN {
                self.default_servlet.get_or_insert_with(|| name.clone());
                continue;
            }
            parsed.push(UrlPattern::parse(raw)?);
        }
        self.entries.push(ServletEntry { name, patterns: parsed });
        Ok(())
    }

    pub fn resolve(&self, path: &str) -> Option<&str> {
        self.find(|p| matches!(p, UrlPattern::Exact(_)) && p.matches(path))
            .or_else(|| self.longest_prefix(path))
            .or_else(|| self.find(|p| matches!(p, UrlPattern::Extension(_)) && p.matches(path)))
            .or(self.default_servlet.as_deref())
    }

    fn find(&self, pred: impl Fn(&UrlPattern) -> bool) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.patterns.iter().any(&pred))
            .map(|e| e.name.as_str())
    }

    fn longest_prefix(&self, path: &str) -> Option<&str> {
        let mut best: Option<(usize, &str)> = None;
        for entry in &self.entries {
            for pattern in &entry.patterns {
                if let UrlPattern::Prefix(stem) = pattern {
                    if pattern.matches(path) && best.map_or(true, |(len, _)| stem.len() > len) {
                        best = Some((stem.len(), entry.name.as_str()));
                    }
                }
            }
        }
        best.map(|(_, name)| name)
    }
}

//! Ordered mapping lookup.
//!
//! # Responsibilities
//! - Hold the registered mappings in registration order
//! - Resolve the ordered filter names for a request
//!
//! # Design Decisions
//! - Immutable once frozen behind `Arc`; `resolve` takes `&self` and no locks
//! - Registration order is invocation order; nothing is sorted or deduplicated
//! - Validation happens when a mapping is built, so `resolve` cannot fail

use crate::mapping::dispatch::DispatchPhase;
use crate::mapping::filter_map::FilterMapping;

/// The mappings of one deployment unit.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    mappings: Vec<FilterMapping>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a mapping after all previously registered ones.
    pub fn register(&mut self, mapping: FilterMapping) {
        tracing::debug!(
            filter = %mapping.filter_name(),
            urls = mapping.url_patterns().len(),
            servlets = mapping.servlet_names().len(),
            dispatchers = %mapping.dispatch_types(),
            "Filter mapping registered"
        );
        self.mappings.push(mapping);
    }

    pub fn mappings(&self) -> &[FilterMapping] {
        &self.mappings
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Filter names to invoke, one entry per matching mapping.
    pub fn resolve<'a>(
        &'a self,
        request_path: &str,
        servlet_name: Option<&str>,
        phase: DispatchPhase,
    ) -> Vec<&'a str> {
        self.mappings
            .iter()
            .filter(|m| m.matches(request_path, servlet_name, phase))
            .map(FilterMapping::filter_name)
            .collect()
    }
}

impl FromIterator<FilterMapping> for MappingTable {
    fn from_iter<I: IntoIterator<Item = FilterMapping>>(iter: I) -> Self {
        let mut table = MappingTable::new();
        for mapping in iter {
            table.register(mapping);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MappingTable {
        [
            FilterMapping::builder("failed").url_pattern("*").build().unwrap(),
            FilterMapping::builder("csrf").url_pattern("/account/*").build().unwrap(),
            FilterMapping::builder("audit").servlet_name("transfer").build().unwrap(),
            FilterMapping::builder("csrf").url_pattern("*.do").build().unwrap(),
            FilterMapping::builder("errors")
                .url_pattern("/*")
                .dispatcher(DispatchPhase::Error)
                .build()
                .unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_resolve_preserves_registration_order() {
        let t = table();
        assert_eq!(
            t.resolve("/account/x", Some("transfer"), DispatchPhase::Request),
            vec!["failed", "csrf", "audit"]
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        let t = table();
        assert_eq!(
            t.resolve("/account/send.do", None, DispatchPhase::Request),
            vec!["failed", "csrf", "csrf"]
        );
    }

    #[test]
    fn test_phase_filters_mappings() {
        let t = table();
        assert_eq!(
            t.resolve("/account/x", None, DispatchPhase::Error),
            vec!["errors"]
        );
        assert!(t.resolve("/account/x", None, DispatchPhase::Include).is_empty());
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let t: MappingTable = [FilterMapping::builder("csrf").url_pattern("/a").build().unwrap()]
            .into_iter()
            .collect();
        assert!(t.resolve("/b", None, DispatchPhase::Request).is_empty());
        assert!(MappingTable::new().resolve("/a", None, DispatchPhase::Request).is_empty());
    }
}

//! Per-request filter chain execution.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::StatusCode;

use crate::mapping::{FilterMapping, MappingTable, ServletMap};
use crate::observability::metrics;
use crate::pipeline::{Filter, FilterOutcome, FilterRequest, FilterResponse};

/// Errors raised while assembling a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("filter '{0}' is defined more than once")]
    DuplicateFilter(String),

    #[error("mapping references undefined filter '{0}'")]
    UndefinedFilter(String),

    #[error(transparent)]
    Mapping(#[from] crate::config::validation::MappingBuildError),

    #[error("servlet '{name}': {source}")]
    Servlet {
        name: String,
        #[source]
        source: crate::mapping::PatternError,
    },

    #[error(transparent)]
    FilterInit(#[from] crate::config::params::FilterConfigError),
}

/// A filter stopped the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub filter: String,
    pub status: StatusCode,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    /// Every matched filter passed; the terminal handler should run.
    Proceed,
    Halted(Rejection),
}

/// Mappings, servlet names and filter instances of one deployment unit.
///
/// Immutable after `build`, so one instance is shared by all request tasks.
#[derive(Debug)]
pub struct FilterPipeline {
    mappings: MappingTable,
    servlets: ServletMap,
    filters: HashMap<String, Arc<dyn Filter>>,
}

impl FilterPipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn mappings(&self) -> &MappingTable {
        &self.mappings
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Filter names that apply to `request`, in invocation order.
    pub fn resolve(&self, request: &FilterRequest) -> Vec<&str> {
        let servlet = request
            .servlet_name()
            .or_else(|| self.servlets.resolve(request.path()));
        self.mappings.resolve(request.path(), servlet, request.phase())
    }

    /// Run the matched filters in order, stopping at the first rejection.
    pub fn run(&self, request: &mut FilterRequest, response: &mut FilterResponse) -> ChainOutcome {
        if request.servlet_name().is_none() {
            let servlet = self.servlets.resolve(request.path()).map(str::to_string);
            request.set_servlet_name(servlet);
        }

        let names = self
            .mappings
            .resolve(request.path(), request.servlet_name(), request.phase());
        tracing::trace!(
            path = %request.path(),
            phase = %request.phase(),
            filters = ?names,
            "Resolved filter chain"
        );

        for name in names {
            // build() guarantees every mapped name has an instance.
            let filter = &self.filters[name];
            metrics::record_filter_invocation(name);
            match filter.do_filter(request, response) {
                FilterOutcome::Continue => {}
                FilterOutcome::Reject { status, reason } => {
                    metrics::record_rejection(name, status.as_u16());
                    return ChainOutcome::Halted(Rejection {
                        filter: name.to_string(),
                        status,
                        reason,
                    });
                }
            }
        }
        ChainOutcome::Proceed
    }
}

/// Collects filters, mappings and servlets, then validates them together.
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    filters: Vec<(String, Arc<dyn Filter>)>,
    mappings: Vec<FilterMapping>,
    servlets: Vec<(String, Vec<String>)>,
}

impl PipelineBuilder {
    pub fn filter(mut self, name: impl Into<String>, filter: Arc<dyn Filter>) -> Self {
        self.filters.push((name.into(), filter));
        self
    }

    /// Mappings are invoked in the order they are added here.
    pub fn mapping(mut self, mapping: FilterMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    pub fn servlet<I, S>(mut self, name: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.servlets
            .push((name.into(), patterns.into_iter().map(Into::into).collect()));
        self
    }

    pub fn build(self) -> Result<FilterPipeline, PipelineError> {
        let mut filters = HashMap::with_capacity(self.filters.len());
        for (name, filter) in self.filters {
            if filters.contains_key(&name) {
                return Err(PipelineError::DuplicateFilter(name));
            }
            filters.insert(name, filter);
        }

        let mut mappings = MappingTable::new();
        for mapping in self.mappings {
            if !filters.contains_key(mapping.filter_name()) {
                return Err(PipelineError::UndefinedFilter(mapping.filter_name().to_string()));
            }
            mappings.register(mapping);
        }

        let mut servlets = ServletMap::new();
        for (name, patterns) in self.servlets {
            servlets
                .add(name.clone(), &patterns)
                .map_err(|source| PipelineError::Servlet { name, source })?;
        }

        tracing::info!(
            filters = filters.len(),
            mappings = mappings.len(),
            "Filter pipeline built"
        );
        Ok(FilterPipeline {
            mappings,
            servlets,
            filters,
        })
    }
}

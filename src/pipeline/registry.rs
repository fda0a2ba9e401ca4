//! Instantiates configured filters and assembles the pipeline.

use std::sync::Arc;

use crate::config::params::FilterParams;
use crate::config::schema::{FilterDef, FilterKind, FilterServerConfig};
use crate::config::validation::build_mapping;
use crate::csrf::{CsrfConfig, CsrfGuard};
use crate::pipeline::{FailedRequestFilter, Filter, FilterPipeline, PipelineError};
use crate::session::SessionStore;

/// Build one filter from its definition.
pub fn instantiate(
    def: &FilterDef,
    sessions: &Arc<dyn SessionStore>,
) -> Result<Arc<dyn Filter>, PipelineError> {
    let params = FilterParams::new(&def.name, &def.params, def.is_strict());
    let filter: Arc<dyn Filter> = match def.kind {
        FilterKind::CsrfPrevention => {
            let config = CsrfConfig::from_params(params)?;
            Arc::new(CsrfGuard::new(&def.name, config, sessions.clone())?)
        }
        FilterKind::FailedRequest => Arc::new(FailedRequestFilter::from_params(params)?),
    };
    tracing::info!(filter = %def.name, kind = ?def.kind, strict = def.is_strict(), "Filter initialised");
    Ok(filter)
}

/// Build the pipeline described by `config`.
pub fn build_pipeline(
    config: &FilterServerConfig,
    sessions: Arc<dyn SessionStore>,
) -> Result<FilterPipeline, PipelineError> {
    let mut builder = FilterPipeline::builder();
    for def in &config.filters {
        builder = builder.filter(def.name.clone(), instantiate(def, &sessions)?);
    }
    for def in &config.mappings {
        builder = builder.mapping(build_mapping(def)?);
    }
    for servlet in &config.servlets {
        builder = builder.servlet(servlet.name.clone(), servlet.url_patterns.iter().cloned());
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::params::FilterConfigError;
    use crate::config::schema::MappingDef;
    use crate::session::InMemorySessionStore;

    fn sessions() -> Arc<dyn SessionStore> {
        Arc::new(InMemorySessionStore::new())
    }

    fn csrf_def(params: &[(&str, &str)], strict: Option<bool>) -> FilterDef {
        FilterDef {
            name: "csrf".into(),
            kind: FilterKind::CsrfPrevention,
            strict,
            params: params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[test]
    fn test_csrf_is_strict_by_default() {
        let err = instantiate(&csrf_def(&[("bogus", "1")], None), &sessions()).unwrap_err();
        assert!(matches!(err, PipelineError::FilterInit(FilterConfigError::UnknownParameter { .. })));
        assert!(instantiate(&csrf_def(&[("bogus", "1")], Some(false)), &sessions()).is_ok());
    }

    #[test]
    fn test_bad_random_source_fatal_even_when_lenient() {
        let def = csrf_def(&[("random_source", "nope"), ("bogus", "1")], Some(false));
        let err = instantiate(&def, &sessions()).unwrap_err();
        assert!(matches!(err, PipelineError::FilterInit(FilterConfigError::RandomSource { .. })));
    }

    #[test]
    fn test_failed_request_is_lenient_by_default() {
        let def = FilterDef {
            name: "failed".into(),
            kind: FilterKind::FailedRequest,
            strict: None,
            params: [("whatever".to_string(), "x".to_string())].into(),
        };
        assert!(instantiate(&def, &sessions()).is_ok());
    }

    #[test]
    fn test_build_from_config() {
        let mut config = FilterServerConfig::default();
        config.filters.push(csrf_def(&[("entry_points", "/")], None));
        config.mappings.push(MappingDef {
            filter: "csrf".into(),
            url_patterns: vec!["/*".into()],
            servlet_names: Vec::new(),
            dispatchers: vec!["request".into(), "forward".into()],
        });
        let pipeline = build_pipeline(&config, sessions()).unwrap();
        assert_eq!(pipeline.filter_count(), 1);
        assert_eq!(pipeline.mappings().len(), 1);
    }
}

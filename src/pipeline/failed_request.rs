//! Rejects requests whose parameters could not be parsed.

use axum::http::StatusCode;

use crate::config::params::{FilterConfigError, FilterParams};
use crate::pipeline::{Filter, FilterOutcome, FilterRequest, FilterResponse};

#[derive(Debug, Default, Clone)]
pub struct FailedRequestFilter;

impl FailedRequestFilter {
    /// Takes no parameters; anything configured is reported by `finish`.
    pub fn from_params(params: FilterParams<'_>) -> Result<Self, FilterConfigError> {
        params.finish()?;
        Ok(Self)
    }
}

impl Filter for FailedRequestFilter {
    fn do_filter(&self, request: &mut FilterRequest, _response: &mut FilterResponse) -> FilterOutcome {
        if request.parameters_failed() {
            tracing::warn!(path = %request.path(), "Rejecting request with unparseable parameters");
            return FilterOutcome::reject(StatusCode::BAD_REQUEST, "request parameters could not be parsed");
        }
        FilterOutcome::Continue
    }
}

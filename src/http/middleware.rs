//! Filter pipeline middleware.
//! Runs the mapped filters before the terminal handler.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::request::{is_form, parse_parameters, session_cookie, session_from_cookies};
use crate::mapping::DispatchPhase;
use crate::pipeline::{ChainOutcome, FilterPipeline, FilterRequest, FilterResponse};
use crate::session::{SessionId, SessionStore};

/// State required by the filter middleware.
#[derive(Clone)]
pub struct FilterState {
    pub pipeline: Arc<FilterPipeline>,
    pub sessions: Arc<dyn SessionStore>,
    pub cookie_name: Arc<str>,
    pub max_body_size: usize,
    pub max_parameters: usize,
}

pub async fn filter_middleware(
    State(state): State<FilterState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    // 1. Buffer form bodies so their parameters are visible to filters.
    let mut parameters_failed = false;
    let mut form = None;
    let body = if is_form(&parts.headers) {
        match axum::body::to_bytes(body, state.max_body_size).await {
            Ok(bytes) => {
                form = Some(bytes.clone());
                Body::from(bytes)
            }
            Err(e) => {
                tracing::warn!(path = %parts.uri.path(), error = %e, "Failed to read form body");
                parameters_failed = true;
                Body::empty()
            }
        }
    } else {
        body
    };

    // 2. Describe the request.
    let parsed = parse_parameters(parts.uri.query(), form.as_deref(), state.max_parameters);
    let phase = parts
        .extensions
        .get::<DispatchPhase>()
        .copied()
        .unwrap_or(DispatchPhase::Request);

    let mut filter_request = FilterRequest::new(parts.method.clone(), parts.uri.path())
        .with_phase(phase)
        .with_params(parsed.params)
        .with_parameters_failed(parameters_failed || parsed.failed);
    if let Some(id) = session_from_cookies(&parts.headers, &state.cookie_name) {
        filter_request = filter_request.with_session(id);
    }

    // 3. Run the chain.
    let mut filter_response = FilterResponse::new();
    if let ChainOutcome::Halted(rejection) = state.pipeline.run(&mut filter_request, &mut filter_response) {
        tracing::info!(
            filter = %rejection.filter,
            status = rejection.status.as_u16(),
            path = %filter_request.path(),
            "Request rejected by filter"
        );
        // A session created on a halted request is unreachable without its cookie.
        if filter_request.session_created() {
            if let Some(id) = filter_request.session() {
                state.sessions.invalidate(id);
            }
        }
        return (rejection.status, rejection.reason).into_response();
    }

    // 4. Hand the wrapped response hooks and session to the handler.
    parts.extensions.insert(filter_response.into_encoder());
    if let Some(id) = filter_request.session() {
        parts.extensions.insert::<SessionId>(id.clone());
    }

    let mut response = next.run(Request::from_parts(parts, body)).await;

    if filter_request.session_created() {
        if let Some(cookie) = filter_request
            .session()
            .and_then(|id| session_cookie(&state.cookie_name, id))
        {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
    }
    response
}

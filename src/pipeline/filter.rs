//! Filter contract and the request/response views filters operate on.

use std::fmt;
use std::sync::Arc;

use axum::http::{Method, StatusCode};

use crate::mapping::DispatchPhase;
use crate::session::SessionId;

/// What a filter sees of an incoming request.
#[derive(Debug, Clone)]
pub struct FilterRequest {
    method: Method,
    path: String,
    servlet_name: Option<String>,
    phase: DispatchPhase,
    params: Vec<(String, String)>,
    session: Option<SessionId>,
    session_created: bool,
    parameters_failed: bool,
}

impl FilterRequest {
    /// `path` is context-relative: servlet path plus extra path info.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            servlet_name: None,
            phase: DispatchPhase::Request,
            params: Vec::new(),
            session: None,
            session_created: false,
            parameters_failed: false,
        }
    }

    pub fn with_phase(mut self, phase: DispatchPhase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_servlet_name(mut self, name: impl Into<String>) -> Self {
        self.servlet_name = Some(name.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn with_params<I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.params.extend(params);
        self
    }

    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_parameters_failed(mut self, failed: bool) -> Self {
        self.parameters_failed = failed;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn servlet_name(&self) -> Option<&str> {
        self.servlet_name.as_deref()
    }

    pub(crate) fn set_servlet_name(&mut self, name: Option<String>) {
        self.servlet_name = name;
    }

    pub fn phase(&self) -> DispatchPhase {
        self.phase
    }

    /// First value submitted for `name`.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn session(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    /// Attach a session created while filtering this request.
    pub fn attach_new_session(&mut self, session: SessionId) {
        self.session = Some(session);
        self.session_created = true;
    }

    /// True when a filter created the session during this request.
    pub fn session_created(&self) -> bool {
        self.session_created
    }

    pub fn parameters_failed(&self) -> bool {
        self.parameters_failed
    }
}

/// A response wrapper hook that rewrites outbound URLs.
pub trait UrlRewriter: Send + Sync + fmt::Debug {
    /// URL for a link or form rendered into the page.
    fn encode_url(&self, url: &str) -> String;

    /// URL for a `Location` header.
    fn encode_redirect_url(&self, url: &str) -> String {
        self.encode_url(url)
    }
}

/// The stack of rewriters installed by filters, applied innermost first.
#[derive(Debug, Clone, Default)]
pub struct UrlEncoder {
    rewriters: Vec<Arc<dyn UrlRewriter>>,
}

impl UrlEncoder {
    pub fn encode_url(&self, url: &str) -> String {
        self.rewriters
            .iter()
            .fold(url.to_string(), |acc, r| r.encode_url(&acc))
    }

    pub fn encode_redirect_url(&self, url: &str) -> String {
        self.rewriters
            .iter()
            .fold(url.to_string(), |acc, r| r.encode_redirect_url(&acc))
    }

    /// See Other redirect to the encoded `url`.
    pub fn redirect(&self, url: &str) -> axum::response::Redirect {
        axum::response::Redirect::to(&self.encode_redirect_url(url))
    }

    pub fn is_identity(&self) -> bool {
        self.rewriters.is_empty()
    }
}

/// The response as it travels down the chain.
#[derive(Debug, Clone, Default)]
pub struct FilterResponse {
    encoder: UrlEncoder,
}

impl FilterResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the response; later wrappers see the output of earlier ones.
    pub fn wrap(&mut self, rewriter: Arc<dyn UrlRewriter>) {
        self.encoder.rewriters.push(rewriter);
    }

    pub fn encode_url(&self, url: &str) -> String {
        self.encoder.encode_url(url)
    }

    pub fn encode_redirect_url(&self, url: &str) -> String {
        self.encoder.encode_redirect_url(url)
    }

    pub fn encoder(&self) -> &UrlEncoder {
        &self.encoder
    }

    pub fn into_encoder(self) -> UrlEncoder {
        self.encoder
    }
}

/// Result of a single filter invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Hand the request to the next stage.
    Continue,
    /// Complete the response now; later stages never run.
    Reject { status: StatusCode, reason: String },
}

impl FilterOutcome {
    pub fn reject(status: StatusCode, reason: impl Into<String>) -> Self {
        FilterOutcome::Reject {
            status,
            reason: reason.into(),
        }
    }
}

/// A request filter.
pub trait Filter: Send + Sync + fmt::Debug {
    fn do_filter(&self, request: &mut FilterRequest, response: &mut FilterResponse) -> FilterOutcome;
}

//! The CSRF prevention filter.
//!
//! # Responsibilities
//! - Let entry-point GETs through without a nonce
//! - Reject any other request whose nonce is missing or not cached
//! - Issue a fresh nonce on every request it lets through
//! - Wrap the response so outbound URLs carry the fresh nonce
//!
//! # Design Decisions
//! - Rejection is an outcome, not an error
//! - The nonce cache lives in the session under a fixed attribute key
//! - Sessions are created lazily, only when a nonce must be stored

use std::sync::Arc;

use axum::http::Method;

use crate::config::params::FilterConfigError;
use crate::csrf::cache::NonceCache;
use crate::csrf::config::CsrfConfig;
use crate::csrf::nonce::{random_source, NonceToken, RandomSource};
use crate::csrf::rewrite::NonceRewriter;
use crate::observability::metrics;
use crate::pipeline::{Filter, FilterOutcome, FilterRequest, FilterResponse};
use crate::session::{Attribute, SessionId, SessionStore};

/// Session attribute holding the per-session `NonceCache`.
pub const NONCE_CACHE_ATTRIBUTE: &str = "request_filter.csrf.nonce_cache";

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoSession,
    NoNonceCache,
    MissingNonce,
    UnknownNonce,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::NoSession => "no session",
            RejectReason::NoNonceCache => "no nonce cache in session",
            RejectReason::MissingNonce => "nonce parameter missing",
            RejectReason::UnknownNonce => "nonce not recognised",
        }
    }
}

/// Outcome of the nonce check for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfDecision {
    /// Entry-point GET; no check required.
    Entry,
    Accepted,
    Rejected(RejectReason),
}

impl CsrfDecision {
    pub fn label(self) -> &'static str {
        match self {
            CsrfDecision::Entry => "entry",
            CsrfDecision::Accepted => "accepted",
            CsrfDecision::Rejected(_) => "rejected",
        }
    }
}

#[derive(Debug)]
pub struct CsrfGuard {
    config: CsrfConfig,
    random: Arc<dyn RandomSource>,
    sessions: Arc<dyn SessionStore>,
}

impl CsrfGuard {
    /// Build the guard. An unknown random source is always fatal.
    pub fn new(
        name: &str,
        config: CsrfConfig,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, FilterConfigError> {
        let random = random_source(&config.random_source).map_err(|source| {
            FilterConfigError::RandomSource {
                filter: name.to_string(),
                source,
            }
        })?;
        Ok(Self::with_random(config, random, sessions))
    }

    pub fn with_random(
        config: CsrfConfig,
        random: Arc<dyn RandomSource>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config,
            random,
            sessions,
        }
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    fn is_entry_point(&self, request: &FilterRequest) -> bool {
        request.method() == Method::GET && self.config.entry_points.contains(request.path())
    }

    /// Classify `request` without side effects.
    pub fn check(&self, request: &FilterRequest) -> CsrfDecision {
        if self.is_entry_point(request) {
            return CsrfDecision::Entry;
        }

        let Some(session) = request.session() else {
            return CsrfDecision::Rejected(RejectReason::NoSession);
        };
        let Some(cache) = self.lookup_cache(session) else {
            return CsrfDecision::Rejected(RejectReason::NoNonceCache);
        };
        let Some(nonce) = request.parameter(&self.config.nonce_parameter) else {
            return CsrfDecision::Rejected(RejectReason::MissingNonce);
        };
        if cache.contains(nonce) {
            CsrfDecision::Accepted
        } else {
            CsrfDecision::Rejected(RejectReason::UnknownNonce)
        }
    }

    /// The session's nonce cache, if it has one.
    pub fn lookup_cache(&self, session: &SessionId) -> Option<Arc<NonceCache>> {
        self.sessions
            .get(session, NONCE_CACHE_ATTRIBUTE)?
            .downcast::<NonceCache>()
            .ok()
    }

    /// The session's nonce cache, creating the session and cache as needed.
    fn cache_for(&self, request: &mut FilterRequest) -> Arc<NonceCache> {
        if let Some(cache) = request.session().and_then(|id| self.cache_in(id)) {
            return cache;
        }

        let id = self.sessions.create();
        request.attach_new_session(id.clone());
        self.cache_in(&id).unwrap_or_else(|| {
            tracing::warn!(session = %id, "Session store refused nonce cache");
            Arc::new(NonceCache::new(self.config.nonce_cache_size))
        })
    }

    fn cache_in(&self, session: &SessionId) -> Option<Arc<NonceCache>> {
        let capacity = self.config.nonce_cache_size;
        let init = || Arc::new(NonceCache::new(capacity)) as Attribute;
        let attribute = self
            .sessions
            .get_or_insert_with(session, NONCE_CACHE_ATTRIBUTE, &init)?;
        match attribute.downcast::<NonceCache>() {
            Ok(cache) => Some(cache),
            Err(_) => {
                tracing::warn!(session = %session, "Replacing foreign nonce cache attribute");
                let cache = Arc::new(NonceCache::new(capacity));
                self.sessions
                    .set(session, NONCE_CACHE_ATTRIBUTE, cache.clone())
                    .then_some(cache)
            }
        }
    }
}

impl Filter for CsrfGuard {
    fn do_filter(&self, request: &mut FilterRequest, response: &mut FilterResponse) -> FilterOutcome {
        let decision = self.check(request);
        metrics::record_csrf_decision(decision.label());

        if let CsrfDecision::Rejected(reason) = decision {
            tracing::warn!(
                method = %request.method(),
                path = %request.path(),
                reason = reason.as_str(),
                "CSRF nonce check failed"
            );
            return FilterOutcome::reject(self.config.deny_status, reason.as_str());
        }

        let nonce = NonceToken::generate(self.random.as_ref());
        let cache = self.cache_for(request);
        cache.add(nonce.as_str());
        metrics::record_nonce_issued();
        tracing::debug!(
            path = %request.path(),
            decision = decision.label(),
            live_nonces = cache.len(),
            "Issued CSRF nonce"
        );

        response.wrap(Arc::new(NonceRewriter::new(
            self.config.nonce_parameter.clone(),
            nonce,
        )));
        FilterOutcome::Continue
    }
}

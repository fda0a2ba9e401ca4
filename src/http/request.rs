//! Request descriptor extraction.
//!
//! # Responsibilities
//! - Read the session handle from the cookie header
//! - Collect request parameters from the query string and form body
//! - Flag parameter parsing failures for the failed-request filter
//!
//! # Design Decisions
//! - Query parameters come before form parameters, like a servlet container
//! - Exceeding the parameter limit keeps the first `max` values and sets the flag

use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use url::form_urlencoded;

use crate::session::SessionId;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Parameters of one request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedParameters {
    pub params: Vec<(String, String)>,
    pub failed: bool,
}

/// True when the body is a URL-encoded form.
pub fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

pub fn parse_parameters(query: Option<&str>, form: Option<&[u8]>, max: usize) -> ParsedParameters {
    let mut parsed = ParsedParameters::default();
    let sources = query
        .map(str::as_bytes)
        .into_iter()
        .chain(form)
        .filter(|s| !s.is_empty());

    for source in sources {
        for (name, value) in form_urlencoded::parse(source) {
            if parsed.params.len() >= max {
                parsed.failed = true;
                return parsed;
            }
            parsed.params.push((name.into_owned(), value.into_owned()));
        }
    }
    parsed
}

/// Session handle from the named cookie, if present and non-empty.
pub fn session_from_cookies(headers: &HeaderMap, cookie_name: &str) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| SessionId::new(value))
}

/// `Set-Cookie` value announcing a new session.
pub fn session_cookie(cookie_name: &str, id: &SessionId) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        cookie_name, id
    ))
    .ok()
}

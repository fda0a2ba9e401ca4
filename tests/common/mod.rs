//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use request_filter::config::{parse_config, FilterServerConfig};
use request_filter::http::FilterServer;
use tower::ServiceExt;

pub const NONCE_PARAM: &str = "csrfToken";

/// Demo deployment with a small nonce window and parameter limit.
pub fn demo_config() -> FilterServerConfig {
    parse_config(
        r#"
        [limits]
        max_parameters = 5

        [[filters]]
        name = "failed"
        kind = "failed_request"

        [[filters]]
        name = "csrf"
        kind = "csrf_prevention"
        [filters.params]
        entry_points = "/"
        nonce_cache_size = "2"

        [[mappings]]
        filter = "failed"
        url_patterns = ["*"]

        [[mappings]]
        filter = "csrf"
        url_patterns = ["/*"]
        "#,
    )
    .expect("demo config is valid")
}

pub fn demo_router() -> Router {
    FilterServer::new(demo_config())
        .expect("pipeline builds")
        .router()
}

/// Response status, headers and body text.
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Reply {
    /// Session handle from `Set-Cookie`, if one was issued.
    pub fn session(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .find(|(name, _)| *name == "SESSIONID")
            .map(|(_, value)| value.to_string())
    }

    /// First nonce embedded in the body.
    pub fn nonce(&self) -> Option<String> {
        nonce_in(&self.body)
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION)?.to_str().ok()
    }
}

pub fn nonce_in(text: &str) -> Option<String> {
    let marker = format!("{NONCE_PARAM}=");
    let start = text.find(&marker)? + marker.len();
    let token: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    (!token.is_empty()).then_some(token)
}

pub async fn send(router: &Router, request: Request<Body>) -> Reply {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    Reply {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

pub fn get(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(id) = session {
        builder = builder.header(header::COOKIE, format!("SESSIONID={id}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, session: Option<&str>, form: &str) -> Request<Body> {
    let mut builder = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(id) = session {
        builder = builder.header(header::COOKIE, format!("SESSIONID={id}"));
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

/// Open a session at the entry point; returns the session and first nonce.
pub async fn enter(router: &Router) -> (String, String) {
    let reply = send(router, get("/", None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let session = reply.session().expect("entry point creates a session");
    let nonce = reply.nonce().expect("entry page carries a nonce");
    (session, nonce)
}

//! Outbound URL rewriting.

use crate::csrf::nonce::NonceToken;
use crate::pipeline::UrlRewriter;

/// Append `name=value` to `url`, after any query and before any fragment.
pub fn append_nonce(url: &str, name: &str, value: &str) -> String {
    let (without_fragment, fragment) = match url.find('#') {
        Some(pound) => url.split_at(pound),
        None => (url, ""),
    };
    let (path, query) = match without_fragment.find('?') {
        Some(question) => without_fragment.split_at(question),
        None => (without_fragment, ""),
    };

    let mut out = String::with_capacity(url.len() + name.len() + value.len() + 2);
    out.push_str(path);
    if query.len() > 1 {
        out.push_str(query);
        out.push('&');
    } else {
        out.push('?');
    }
    out.push_str(name);
    out.push('=');
    out.push_str(value);
    out.push_str(fragment);
    out
}

/// Response wrapper installed by the CSRF guard.
#[derive(Debug, Clone)]
pub struct NonceRewriter {
    parameter: String,
    nonce: NonceToken,
}

impl NonceRewriter {
    pub fn new(parameter: impl Into<String>, nonce: NonceToken) -> Self {
        Self {
            parameter: parameter.into(),
            nonce,
        }
    }

    pub fn nonce(&self) -> &NonceToken {
        &self.nonce
    }
}

impl UrlRewriter for NonceRewriter {
    fn encode_url(&self, url: &str) -> String {
        append_nonce(url, &self.parameter, self.nonce.as_str())
    }

    fn encode_redirect_url(&self, url: &str) -> String {
        append_nonce(url, &self.parameter, self.nonce.as_str())
    }
}

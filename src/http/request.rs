//! Request inspection helpers.
//!
//! # Design Decisions
//! - The request ID is assigned by middleware before any handler runs
//! - Cookies are read leniently: malformed pairs are skipped, not rejected

use axum::http::header::{self, HeaderMap, HeaderName};

use crate::api::types::BearerToken;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// The request ID set by the middleware, or `unknown`.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Value of cookie `name`, across all `Cookie` headers.
pub fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Session token from the cookie named `cookie_name`.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<BearerToken> {
    cookie(headers, cookie_name).map(BearerToken::new)
}

/// Printable prefix of a request body for failure logs.
pub fn body_preview(body: &[u8]) -> String {
    const MAX: usize = 512;
    let end = body.len().min(MAX);
    let mut preview = String::from_utf8_lossy(&body[..end]).into_owned();
    if body.len() > MAX {
        preview.push_str("...");
    }
    preview
}

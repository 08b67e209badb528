//! Response construction.
//!
//! # Design Decisions
//! - Backend error bodies are never relayed; the status alone is
//! - Only `Content-Type` survives relaying, hop-by-hop headers are dropped
//! - Upstream failures and aborts both become 503

use axum::body::{Body, Bytes};
use axum::http::header::{self, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::config::SessionConfig;

/// Status with an empty body.
pub fn empty(status: StatusCode) -> Response {
    status.into_response()
}

/// Pass a successful backend response through. The body was read in full
/// under the request deadline.
pub fn relay(upstream: hyper::Response<Bytes>) -> Response {
    let (parts, body) = upstream.into_parts();
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = parts.status;
    if let Some(content_type) = parts.headers.get(header::CONTENT_TYPE) {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type.clone());
    }
    response
}

/// `302 Found` to `location`, optionally setting a cookie.
pub fn redirect(location: &'static str, cookie: Option<String>) -> Response {
    let mut response = empty(StatusCode::FOUND);
    response
        .headers_mut()
        .insert(header::LOCATION, HeaderValue::from_static(location));
    if let Some(cookie) = cookie {
        with_cookie(&mut response, cookie);
    }
    response
}

pub fn with_cookie(response: &mut Response, cookie: String) {
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!(error = %e, "Refusing to send malformed Set-Cookie"),
    }
}

/// `Set-Cookie` value storing the session token.
pub fn session_cookie(config: &SessionConfig, token: &str) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; Max-Age={}",
        config.cookie_name, token, config.max_age_secs
    );
    if config.secure_cookie {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that makes the browser drop the session cookie.
pub fn clear_session_cookie(config: &SessionConfig) -> String {
    format!(
        "{}=; Path=/; HttpOnly; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        config.cookie_name
    )
}

//! Forwarding of public write requests to the internal backend.
//!
//! Each request is checked against the route table, buffered up to the body
//! limit, and sent to the backend under one cancellation signal. The signal
//! covers the whole exchange, including reading the backend's body. The
//! backend's status is relayed. Its body is relayed only on success.

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{Path, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::Response,
};
use http_body_util::BodyExt;
use thiserror::Error;

use crate::http::request::{body_preview, request_id, session_token, X_REQUEST_ID};
use crate::http::response::{empty, relay};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::resilience::with_deadline;
use crate::routing::{RouteKind, RouteMatch};

/// Why a forwarded request produced no backend response.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid backend URL `{0}`")]
    InvalidUri(String),

    #[error("could not build backend request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("backend unreachable: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("backend body failed: {0}")]
    Body(#[from] hyper::Error),

    #[error("backend did not answer within {0:?}")]
    Aborted(std::time::Duration),
}

/// Headers carried over from the public request.
const FORWARDED: [header::HeaderName; 2] = [header::CONTENT_TYPE, header::ACCEPT];

pub(crate) async fn forward(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    request: Request,
) -> Response {
    proxy(state, resource, None, request).await
}

pub(crate) async fn forward_nested(
    State(state): State<AppState>,
    Path((resource, rest)): Path<(String, String)>,
    request: Request,
) -> Response {
    proxy(state, resource, Some(rest), request).await
}

async fn proxy(state: AppState, resource: String, rest: Option<String>, request: Request) -> Response {
    let start = Instant::now();
    let shared = state.snapshot();
    let request_id = request_id(request.headers());
    let method = request.method().clone();
    let kind = RouteKind::for_rest(rest.as_deref());

    let route = match shared.routes.resolve(&resource, kind, &method) {
        RouteMatch::Allowed(route) => route,
        RouteMatch::MethodNotAllowed(resource) => {
            tracing::debug!(request_id = %request_id, resource = %resource, kind = %kind, method = %method, "Method not allowed");
            metrics::record_request(resource.as_str(), method.as_str(), 405, start);
            return method_not_allowed(&shared.routes.allowed_methods(resource, kind));
        }
        RouteMatch::UnknownResource => {
            tracing::debug!(request_id = %request_id, resource = %resource, "Unknown resource");
            return empty(StatusCode::NOT_FOUND);
        }
    };
    let label = route.resource.as_str();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, shared.config.limits.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, resource = label, error = %e, "Request body rejected");
            metrics::record_request(label, method.as_str(), 413, start);
            return empty(StatusCode::PAYLOAD_TOO_LARGE);
        }
    };

    tracing::debug!(request_id = %request_id, resource = label, method = %method, bytes = body.len(), "Forwarding request");

    let url = route.backend_url(&shared.config.backend.internal_base, rest.as_deref(), parts.uri.query());
    let token = session_token(&parts.headers, &shared.config.session.cookie_name);
    let outbound = build_request(
        &route.backend_method,
        &url,
        &parts.headers,
        &request_id,
        token.map(|t| t.authorization()),
        body.clone(),
    );

    let timeout = shared.config.timeouts.request();
    let result = match outbound {
        Ok(outbound) => with_deadline(state.cancellation.as_ref(), timeout, exchange(&state, outbound))
            .await
            .map_err(|aborted| ForwardError::Aborted(aborted.0))
            .and_then(|res| res),
        Err(e) => Err(e),
    };

    match result {
        Ok(upstream) => {
            let status = upstream.status();
            metrics::record_request(label, method.as_str(), status.as_u16(), start);
            if status.is_success() {
                relay(upstream)
            } else {
                tracing::debug!(request_id = %request_id, resource = label, status = %status, "Backend refused request");
                empty(status)
            }
        }
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                resource = label,
                body = %body_preview(&body),
                error = %e,
                "Forwarding failed"
            );
            metrics::record_upstream_failure(label, matches!(e, ForwardError::Aborted(_)));
            metrics::record_request(label, method.as_str(), 503, start);
            empty(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Send `outbound` and, when the backend accepts it, read the whole body.
///
/// A refused request's body is dropped unread.
async fn exchange(
    state: &AppState,
    outbound: hyper::Request<Body>,
) -> Result<hyper::Response<Bytes>, ForwardError> {
    let upstream = state.client.request(outbound).await?;
    let (parts, body) = upstream.into_parts();
    let bytes = if parts.status.is_success() {
        body.collect().await?.to_bytes()
    } else {
        Bytes::new()
    };
    Ok(hyper::Response::from_parts(parts, bytes))
}

fn build_request(
    method: &Method,
    url: &str,
    inbound: &HeaderMap,
    request_id: &str,
    authorization: Option<String>,
    body: Bytes,
) -> Result<hyper::Request<Body>, ForwardError> {
    let uri: Uri = url.parse().map_err(|_| ForwardError::InvalidUri(url.to_string()))?;
    let mut builder = hyper::Request::builder().method(method.clone()).uri(uri);

    for name in FORWARDED {
        if let Some(value) = inbound.get(&name) {
            builder = builder.header(name, value.clone());
        }
    }
    if let Ok(value) = HeaderValue::from_str(request_id) {
        builder = builder.header(X_REQUEST_ID, value);
    }
    if let Some(authorization) = authorization {
        builder = builder.header(header::AUTHORIZATION, authorization);
    }

    Ok(builder.body(Body::from(body))?)
}

fn method_not_allowed(allowed: &[Method]) -> Response {
    let mut response = empty(StatusCode::METHOD_NOT_ALLOWED);
    let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

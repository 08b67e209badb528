//! Magic-link login and logout.
//!
//! The backend mails a one-time link to `/magic?token=...`. Following it
//! exchanges that token for a session token, stored in an HttpOnly cookie.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;

use crate::http::request::{request_id, session_token};
use crate::http::response::{clear_session_cookie, empty, redirect, session_cookie, with_cookie};
use crate::http::server::AppState;

/// `POST {prefix}/session` with `{"email": ...}`: mail a login link.
pub(crate) async fn create(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let email = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|body| body.get("email").and_then(Value::as_str).map(str::to_string));
    let Some(email) = email else {
        return (StatusCode::BAD_REQUEST, "Missing email").into_response();
    };

    let shared = state.snapshot();
    match shared.internal.create_session(&email).await {
        Ok(()) => (StatusCode::CREATED, "{}").into_response(),
        Err(e) => {
            tracing::warn!(request_id = %request_id(&headers), error = %e, "Could not create session");
            (StatusCode::SERVICE_UNAVAILABLE, "Could not create session").into_response()
        }
    }
}

/// `DELETE {prefix}/session`: end the cookie's session.
pub(crate) async fn delete(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let shared = state.snapshot();
    end_session(&shared, &headers).await;
    let mut response = empty(StatusCode::NO_CONTENT);
    with_cookie(&mut response, clear_session_cookie(&shared.config.session));
    response
}

#[derive(Debug, Deserialize)]
pub(crate) struct MagicLink {
    token: Option<String>,
}

/// `GET /magic?token=...`: log in and land on the account page.
pub(crate) async fn magic(
    State(state): State<AppState>,
    Query(link): Query<MagicLink>,
    headers: HeaderMap,
) -> Response {
    let shared = state.snapshot();
    let Some(magic_token) = link.token.filter(|t| !t.is_empty()) else {
        tracing::debug!(request_id = %request_id(&headers), "Magic link without token");
        return redirect("/a", None);
    };

    match shared.internal.verify_session(&magic_token).await {
        Ok(token) => {
            tracing::info!(request_id = %request_id(&headers), "Session verified");
            redirect("/a", Some(session_cookie(&shared.config.session, token.as_str())))
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id(&headers), error = %e, "Magic link verification failed");
            redirect("/a", None)
        }
    }
}

/// `GET /l`: log out and go home.
pub(crate) async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let shared = state.snapshot();
    end_session(&shared, &headers).await;
    redirect("/", Some(clear_session_cookie(&shared.config.session)))
}

async fn end_session(shared: &crate::http::server::SharedState, headers: &HeaderMap) {
    let Some(token) = session_token(headers, &shared.config.session.cookie_name) else {
        return;
    };
    if let Err(e) = shared.internal.delete_session(&token).await {
        tracing::warn!(request_id = %request_id(headers), error = %e, "Could not delete backend session");
    }
}

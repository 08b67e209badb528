//! Page data routes.
//!
//! Each route answers with the JSON props its page renders from. A missing
//! record and a failed lookup look the same to the browser: 404.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::api::types::{Catalog, FileSupport};
use crate::api::ApiError;
use crate::http::response::empty;
use crate::http::server::AppState;

pub const FEED_ERROR: &str = "Oops, something went wrong loading this feed!";

fn found(key: &'static str, what: &str, result: Result<Option<Value>, ApiError>) -> Response {
    match result {
        Ok(Some(record)) => Json(json!({ key: record })).into_response(),
        Ok(None) => empty(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::warn!(record = key, id = what, error = %e, "Page lookup failed");
            empty(StatusCode::NOT_FOUND)
        }
    }
}

/// `/`: the global photo feed.
pub(crate) async fn feed(State(state): State<AppState>) -> Json<Value> {
    match state.snapshot().internal.fetch_photos().await {
        Ok(photos) => Json(json!({ "photos": photos })),
        Err(e) => {
            tracing::warn!(error = %e, "Feed lookup failed");
            Json(json!({ "photos": [], "error": FEED_ERROR }))
        }
    }
}

/// `/a/{handle}`: public profile.
pub(crate) async fn account(State(state): State<AppState>, Path(handle): Path<String>) -> Response {
    let result = state.snapshot().internal.fetch_account(&handle).await;
    found("account", &handle, result)
}

/// `/p/{photo_id}`
pub(crate) async fn photo(State(state): State<AppState>, Path(photo_id): Path<String>) -> Response {
    let result = state.snapshot().internal.fetch_photo(&photo_id).await;
    found("photo", &photo_id, result)
}

/// `/a/{handle}/p/{photo_id}`: a photo, only under the account that posted it.
pub(crate) async fn account_photo(
    State(state): State<AppState>,
    Path((handle, photo_id)): Path<(String, String)>,
) -> Response {
    let result = state
        .snapshot()
        .internal
        .fetch_photo(&photo_id)
        .await
        .map(|photo| photo.filter(|p| p["account"]["safename"].as_str() == Some(handle.as_str())));
    found("photo", &photo_id, result)
}

/// `/e/{edit_id}`
pub(crate) async fn edit(State(state): State<AppState>, Path(edit_id): Path<String>) -> Response {
    let result = state.snapshot().internal.fetch_edit(&edit_id).await;
    found("edit", &edit_id, result)
}

/// `/c`: what the submission form needs.
pub(crate) async fn catalog(State(state): State<AppState>) -> Response {
    let shared = state.snapshot();
    let (manufacturers, file_support) = tokio::join!(
        shared.internal.fetch_manufacturers(),
        shared.internal.fetch_file_support()
    );

    let manufacturers = match manufacturers {
        Ok(manufacturers) => manufacturers,
        Err(e) => {
            tracing::warn!(error = %e, "Catalog lookup failed");
            return empty(StatusCode::SERVICE_UNAVAILABLE);
        }
    };
    let file_support = file_support.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "File support lookup failed, accepting any file");
        FileSupport::default()
    });

    Json(Catalog {
        manufacturers,
        file_support,
        public_api: Some(shared.config.backend.public_base.clone()),
    })
    .into_response()
}

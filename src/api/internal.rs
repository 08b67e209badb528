//! Server-side client for the internal backend.
//!
//! Never hand this to anything reachable from a browser: it can run arbitrary
//! GraphQL against the backend.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::graphql::{self, GraphQlRequest, GraphQlResponse, Operation};
use crate::api::types::{BearerToken, FileSupport, Manufacturer, SessionVerified};
use crate::api::{send, send_json, ApiError};
use crate::resilience::CancellationSource;

#[derive(Debug, Clone)]
pub struct InternalApi {
    client: reqwest::Client,
    base: String,
    timeout: Duration,
    cancellation: Arc<dyn CancellationSource>,
}

#[derive(Deserialize)]
struct PhotosData {
    photos: Vec<Value>,
}

#[derive(Deserialize)]
struct AccountData {
    account: Option<Value>,
}

#[derive(Deserialize)]
struct PhotoData {
    photo: Option<Value>,
}

#[derive(Deserialize)]
struct EditData {
    edit: Option<Value>,
}

#[derive(Deserialize)]
struct ManufacturersData {
    manufacturers: Vec<Manufacturer>,
}

impl InternalApi {
    pub fn new(
        client: reqwest::Client,
        base: impl Into<String>,
        timeout: Duration,
        cancellation: Arc<dyn CancellationSource>,
    ) -> Self {
        Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
            timeout,
            cancellation,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Run a named operation and return its `data`.
    pub async fn query<T: DeserializeOwned>(&self, op: &Operation, variables: Value) -> Result<T, ApiError> {
        tracing::debug!(operation = op.name, "GraphQL query");
        let request = self
            .client
            .post(self.url("/graphql"))
            .json(&GraphQlRequest::new(op, variables));
        let response: GraphQlResponse<T> =
            send_json(self.cancellation.as_ref(), self.timeout, request).await?;

        if !response.errors.is_empty() {
            let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
            return Err(ApiError::GraphQl(messages.join("; ")));
        }
        response.data.ok_or(ApiError::Missing("data"))
    }

    /// Public profile by safename (the URL handle). `None` when no such account.
    pub async fn fetch_account(&self, handle: &str) -> Result<Option<Value>, ApiError> {
        let data: AccountData = self
            .query(&graphql::PUBLIC_ACCOUNT, json!({ "accountSafename": handle }))
            .await?;
        Ok(data.account)
    }

    pub async fn fetch_photos(&self) -> Result<Vec<Value>, ApiError> {
        let data: PhotosData = self.query(&graphql::PHOTOS, json!({})).await?;
        Ok(data.photos)
    }

    pub async fn fetch_photo(&self, photo_id: &str) -> Result<Option<Value>, ApiError> {
        let data: PhotoData = self.query(&graphql::PHOTO, json!({ "photoId": photo_id })).await?;
        Ok(data.photo)
    }

    pub async fn fetch_edit(&self, edit_id: &str) -> Result<Option<Value>, ApiError> {
        let data: EditData = self.query(&graphql::EDIT, json!({ "editId": edit_id })).await?;
        Ok(data.edit)
    }

    /// Equipment catalog used to populate the camera and lens selectors.
    pub async fn fetch_manufacturers(&self) -> Result<Vec<Manufacturer>, ApiError> {
        let data: ManufacturersData = self.query(&graphql::MANUFACTURERS, json!({})).await?;
        Ok(data.manufacturers)
    }

    pub async fn fetch_file_support(&self) -> Result<FileSupport, ApiError> {
        let request = self.client.get(self.url("/config/file_support"));
        send_json(self.cancellation.as_ref(), self.timeout, request).await
    }

    /// Ask the backend to mail a magic link to `email`.
    pub async fn create_session(&self, email: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url("/session"))
            .json(&json!({ "account_email": email }));
        send(self.cancellation.as_ref(), self.timeout, request).await?;
        Ok(())
    }

    /// Exchange a magic-link token for a session token.
    pub async fn verify_session(&self, magic_token: &str) -> Result<BearerToken, ApiError> {
        let request = self
            .client
            .post(self.url("/session"))
            .json(&json!({ "token": magic_token }));
        let verified: SessionVerified =
            send_json(self.cancellation.as_ref(), self.timeout, request).await?;
        verified.token.ok_or(ApiError::Missing("token"))
    }

    pub async fn delete_session(&self, token: &BearerToken) -> Result<(), ApiError> {
        let request = self
            .client
            .delete(self.url("/session"))
            .json(&json!({ "token": token.as_str() }));
        send(self.cancellation.as_ref(), self.timeout, request).await?;
        Ok(())
    }
}

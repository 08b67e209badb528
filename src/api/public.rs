//! Client for the public API, as used from the browser side.
//!
//! Only knows how to create photos and edits. Everything is sent as
//! multipart form data with the session token in `Authorization`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;

use crate::api::types::{BearerToken, EditCreated, EditId, PhotoCreated, PhotoId};
use crate::api::{send_json, ApiError};
use crate::forms::draft::{Attachment, EditDraft, PhotoDraft};
use crate::forms::Submitter;
use crate::resilience::CancellationSource;

#[derive(Debug, Clone)]
pub struct PublicApi {
    client: reqwest::Client,
    base: String,
    timeout: Duration,
    cancellation: Arc<dyn CancellationSource>,
    token: Option<BearerToken>,
}

fn multipart(fields: Vec<(String, String)>, files: [(&'static str, &Option<Attachment>); 2]) -> Form {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }
    for (name, file) in files {
        if let Some(file) = file {
            let part = Part::bytes(file.content.clone()).file_name(file.file_name.clone());
            form = form.part(name, part);
        }
    }
    form
}

impl PublicApi {
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
            token: None,
        }
    }

    /// Authenticate subsequent calls with the session token.
    pub fn with_token(mut self, token: BearerToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn put(&self, path: &str) -> RequestBuilder {
        let request = self.client.put(format!("{}{}", self.base, path));
        match &self.token {
            Some(token) => request.header(reqwest::header::AUTHORIZATION, token.authorization()),
            None => request,
        }
    }

    pub async fn create_photo(&self, handle: &str, photo: &PhotoDraft) -> Result<PhotoId, ApiError> {
        let form = multipart(
            photo.form_fields(handle),
            [("raw_file", &photo.raw_file), ("preview_file", &photo.preview_file)],
        );
        let created: PhotoCreated =
            send_json(self.cancellation.as_ref(), self.timeout, self.put("/photo").multipart(form)).await?;
        Ok(created.photo_id)
    }

    pub async fn create_edit(&self, edit: &EditDraft) -> Result<EditId, ApiError> {
        if edit.photo_id.is_none() {
            return Err(ApiError::Missing("photo_id"));
        }
        let form = multipart(
            edit.form_fields(),
            [("edit_file", &edit.sidecar_file), ("preview_file", &edit.preview_file)],
        );
        let created: EditCreated =
            send_json(self.cancellation.as_ref(), self.timeout, self.put("/edit").multipart(form)).await?;
        Ok(created.edit_id)
    }
}

#[async_trait]
impl Submitter for PublicApi {
    async fn submit_photo(&self, handle: &str, photo: &PhotoDraft) -> Result<PhotoId, ApiError> {
        self.create_photo(handle, photo).await
    }

    async fn submit_edit(&self, edit: &EditDraft) -> Result<EditId, ApiError> {
        self.create_edit(edit).await
    }
}

//! A photo together with its edits, submitted as one unit.
//!
//! The photo is created first. Its new id is then stamped on every edit and
//! the edits are sent concurrently. An edit that fails at that point is
//! logged and counted but does not undo the photo or block navigation.

use std::fmt;

use async_trait::async_trait;
use futures_util::future::join_all;
use thiserror::Error;

use crate::api::types::{EditId, Manufacturer, PhotoId};
use crate::api::ApiError;
use crate::forms::draft::{DraftId, EditDraft, EditInput, PhotoDraft, PhotoInput};
use crate::forms::validation::{validate_composite, ValidationReport};
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    /// Nothing entered yet.
    Empty,
    Editing,
    Validating,
    /// Requests in flight.
    Submitting,
    /// Photo created; the form is done.
    Submitted,
    /// Last submit failed validation. Accepts input like `Editing`.
    Rejected,
    /// Last submit failed on the photo request. Accepts input like `Editing`.
    Failed,
}

impl FormState {
    pub fn accepts_input(self) -> bool {
        matches!(
            self,
            FormState::Empty | FormState::Editing | FormState::Rejected | FormState::Failed
        )
    }
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormState::Empty => "empty",
            FormState::Editing => "editing",
            FormState::Validating => "validating",
            FormState::Submitting => "submitting",
            FormState::Submitted => "submitted",
            FormState::Rejected => "rejected",
            FormState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Creates photos and edits on the backend.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit_photo(&self, handle: &str, photo: &PhotoDraft) -> Result<PhotoId, ApiError>;

    /// `edit.photo_id` is always set when this is called.
    async fn submit_edit(&self, edit: &EditDraft) -> Result<EditId, ApiError>;
}

/// Moves the user to another page once the form is done.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("form was already submitted")]
    AlreadySubmitted,

    #[error("validation failed: {0}")]
    Invalid(ValidationReport),

    #[error("photo submission failed: {0}")]
    Photo(#[source] ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub photo_id: PhotoId,
    /// Page the navigator was sent to.
    pub location: String,
}

/// Canonical page of a photo, e.g. `/a/ansel/p/42`.
pub fn photo_path(handle: &str, photo_id: PhotoId) -> String {
    let mut url = match url::Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return format!("/a/{}/p/{}", handle, photo_id),
    };
    let id = photo_id.to_string();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().extend(["a", handle, "p", id.as_str()]);
    }
    url.path().to_string()
}

/// State container for one photo-with-edits form.
#[derive(Debug, Clone)]
pub struct CompositeForm {
    handle: String,
    catalog: Vec<Manufacturer>,
    photo: PhotoDraft,
    edits: Vec<EditDraft>,
    state: FormState,
}

impl CompositeForm {
    /// An empty form posting to account `handle`, with the equipment catalog
    /// used to resolve camera and lens selections.
    pub fn new(handle: impl Into<String>, catalog: Vec<Manufacturer>) -> Self {
        Self {
            handle: handle.into(),
            catalog,
            photo: PhotoDraft::default(),
            edits: Vec::new(),
            state: FormState::Empty,
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn catalog(&self) -> &[Manufacturer] {
        &self.catalog
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn photo(&self) -> &PhotoDraft {
        &self.photo
    }

    pub fn edits(&self) -> &[EditDraft] {
        &self.edits
    }

    pub fn edit(&self, id: DraftId) -> Option<&EditDraft> {
        self.edits.iter().find(|edit| edit.draft_id == id)
    }

    fn accept_input(&mut self) -> bool {
        if !self.state.accepts_input() {
            tracing::debug!(state = %self.state, "Ignoring input");
            return false;
        }
        true
    }

    fn settle(&mut self) {
        self.state = if self.photo.is_empty() && self.edits.is_empty() {
            FormState::Empty
        } else {
            FormState::Editing
        };
    }

    pub fn update_photo(&mut self, input: PhotoInput) {
        if !self.accept_input() {
            return;
        }
        self.photo = self.photo.apply(input, &self.catalog);
        self.settle();
    }

    /// Append a blank edit draft and return its id.
    pub fn add_edit(&mut self) -> Option<DraftId> {
        if !self.accept_input() {
            return None;
        }
        let edit = EditDraft::new();
        let id = edit.draft_id;
        self.edits.push(edit);
        self.settle();
        Some(id)
    }

    pub fn update_edit(&mut self, id: DraftId, input: EditInput) -> bool {
        if !self.accept_input() {
            return false;
        }
        let Some(slot) = self.edits.iter_mut().find(|edit| edit.draft_id == id) else {
            return false;
        };
        *slot = slot.apply(input);
        self.settle();
        true
    }

    pub fn delete_edit(&mut self, id: DraftId) -> bool {
        if !self.accept_input() {
            return false;
        }
        let before = self.edits.len();
        self.edits.retain(|edit| edit.draft_id != id);
        let removed = self.edits.len() != before;
        self.settle();
        removed
    }

    /// Validate, create the photo, then its edits, then navigate.
    ///
    /// On validation failure nothing is sent and the drafts stay as they
    /// were. On photo failure the drafts are kept for another attempt.
    /// Dropping the future before it completes leaves the form `Failed`.
    pub async fn submit<S, N>(&mut self, submitter: &S, navigator: &N) -> Result<Submitted, SubmitError>
    where
        S: Submitter + ?Sized,
        N: Navigator + ?Sized,
    {
        if self.state == FormState::Submitted {
            return Err(SubmitError::AlreadySubmitted);
        }

        self.state = FormState::Validating;
        if let Err(report) = validate_composite(&self.photo, &self.edits) {
            tracing::debug!(failures = report.failures.len(), "Submission rejected");
            self.state = FormState::Rejected;
            return Err(SubmitError::Invalid(report));
        }

        self.state = FormState::Submitting;
        let in_flight = InFlight { state: &mut self.state };
        let photo_id = match submitter.submit_photo(&self.handle, &self.photo).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(handle = %self.handle, error = %e, "Photo submission failed");
                *in_flight.state = FormState::Failed;
                return Err(SubmitError::Photo(e));
            }
        };
        tracing::info!(handle = %self.handle, photo_id = %photo_id, edits = self.edits.len(), "Photo created");

        let edits: Vec<EditDraft> = self.edits.iter().map(|edit| edit.attached_to(photo_id)).collect();
        let results = join_all(edits.iter().map(|edit| async move {
            (edit.draft_id, submitter.submit_edit(edit).await)
        }))
        .await;

        for (draft_id, result) in results {
            match result {
                Ok(edit_id) => {
                    tracing::debug!(draft = %draft_id, edit_id = %edit_id, photo_id = %photo_id, "Edit created");
                }
                Err(e) => {
                    tracing::warn!(draft = %draft_id, photo_id = %photo_id, error = %e, "Edit dropped after photo was created");
                    metrics::record_dependent_failure();
                }
            }
        }

        self.edits = edits;
        *in_flight.state = FormState::Submitted;
        drop(in_flight);

        let location = photo_path(&self.handle, photo_id);
        navigator.navigate(&location);
        Ok(Submitted { photo_id, location })
    }
}

/// Falls back to `Failed` if a submission is abandoned while `Submitting`.
struct InFlight<'a> {
    state: &'a mut FormState,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if *self.state == FormState::Submitting {
            tracing::warn!("Submission abandoned in flight");
            *self.state = FormState::Failed;
        }
    }
}

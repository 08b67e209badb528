//! Photo and edit drafts.
//!
//! Drafts are plain values. Every input event produces a whole new draft
//! from the previous one, so a caller holding the old value never sees a
//! half-applied change.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use uuid::Uuid;

use crate::api::types::{Manufacturer, PhotoId};
use crate::forms::equipment::{EquipmentFields, EquipmentInput, EquipmentKind, LensSpecs};

/// A file picked for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Read a file from disk, keeping only its final path component as the name.
    pub async fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self { file_name, content })
    }

    /// Lowercased extension, without the dot.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("len", &self.content.len())
            .finish()
    }
}

/// Parse an optional numeric field. Blank and unparsable text become `None`.
pub fn parse_number<T: FromStr>(text: &str) -> Option<T> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse().ok()
}

/// Exposure settings of a photo.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraSettings {
    pub aperture: Option<f64>,
    pub flash: Option<bool>,
    pub focal_length: Option<f64>,
    pub iso: Option<u32>,
    pub shutter_speed_numerator: Option<u32>,
    pub shutter_speed_denominator: Option<u32>,
}

impl CameraSettings {
    fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::new();
        let mut push = |name: &str, value: Option<String>| {
            if let Some(value) = value {
                fields.push((name.to_string(), value));
            }
        };
        push("aperture", self.aperture.map(|v| v.to_string()));
        push("flash", self.flash.map(|v| v.to_string()));
        push("focal_length", self.focal_length.map(|v| v.to_string()));
        push("iso", self.iso.map(|v| v.to_string()));
        push("shutter_speed_numerator", self.shutter_speed_numerator.map(|v| v.to_string()));
        push("shutter_speed_denominator", self.shutter_speed_denominator.map(|v| v.to_string()));
        fields
    }
}

/// The primary record of a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoDraft {
    pub title: String,
    pub text: String,
    pub raw_file: Option<Attachment>,
    pub preview_file: Option<Attachment>,
    pub settings: CameraSettings,
    pub camera: EquipmentFields,
    pub lens: EquipmentFields,
    pub lens_specs: LensSpecs,
}

impl Default for PhotoDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            text: String::new(),
            raw_file: None,
            preview_file: None,
            settings: CameraSettings::default(),
            camera: EquipmentFields::new(EquipmentKind::Camera),
            lens: EquipmentFields::new(EquipmentKind::Lens),
            lens_specs: LensSpecs::default(),
        }
    }
}

/// One input event on the photo form.
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoInput {
    Title(String),
    Text(String),
    RawFile(Option<Attachment>),
    PreviewFile(Option<Attachment>),
    Settings(CameraSettings),
    Camera(EquipmentInput),
    Lens(EquipmentInput),
    LensSpecs(LensSpecs),
}

impl PhotoDraft {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, input: PhotoInput, catalog: &[Manufacturer]) -> Self {
        let mut next = self.clone();
        match input {
            PhotoInput::Title(title) => next.title = title,
            PhotoInput::Text(text) => next.text = text,
            PhotoInput::RawFile(file) => next.raw_file = file,
            PhotoInput::PreviewFile(file) => next.preview_file = file,
            PhotoInput::Settings(settings) => next.settings = settings,
            PhotoInput::Camera(input) => next.camera = self.camera.apply(input, catalog),
            PhotoInput::Lens(input) => {
                next.lens = self.lens.apply(input, catalog);
                // A catalog lens already carries its ranges.
                if next.lens.id.is_some() {
                    next.lens_specs = LensSpecs::default();
                }
            }
            PhotoInput::LensSpecs(specs) => {
                if next.lens.id.is_some() {
                    tracing::debug!("Ignoring lens ranges for a catalog lens");
                } else {
                    next.lens_specs = specs;
                }
            }
        }
        next
    }

    /// Text fields of the multipart upload for account `handle`.
    pub fn form_fields(&self, handle: &str) -> Vec<(String, String)> {
        let mut fields = vec![
            ("account_safename".to_string(), handle.to_string()),
            ("photo_title".to_string(), self.title.clone()),
            ("photo_text".to_string(), self.text.clone()),
        ];
        fields.extend(self.settings.form_fields());
        fields.extend(self.camera.form_fields());
        fields.extend(self.lens.form_fields());
        fields.extend(self.lens_specs.form_fields());
        fields
    }
}

/// Client-side identity of an edit draft, assigned before the server knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftId(Uuid);

impl DraftId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Software an edit was made with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorInfo {
    pub name: String,
    pub version: String,
    pub platform: String,
}

/// A dependent record, attached to the photo once it has an id.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    pub draft_id: DraftId,
    pub title: String,
    pub text: String,
    pub sidecar_file: Option<Attachment>,
    pub preview_file: Option<Attachment>,
    pub editor: EditorInfo,
    pub photo_id: Option<PhotoId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditInput {
    Title(String),
    Text(String),
    SidecarFile(Option<Attachment>),
    PreviewFile(Option<Attachment>),
    Editor(EditorInfo),
}

impl EditDraft {
    pub fn new() -> Self {
        Self {
            draft_id: DraftId::new(),
            title: String::new(),
            text: String::new(),
            sidecar_file: None,
            preview_file: None,
            editor: EditorInfo::default(),
            photo_id: None,
        }
    }

    pub fn apply(&self, input: EditInput) -> Self {
        let mut next = self.clone();
        match input {
            EditInput::Title(title) => next.title = title,
            EditInput::Text(text) => next.text = text,
            EditInput::SidecarFile(file) => next.sidecar_file = file,
            EditInput::PreviewFile(file) => next.preview_file = file,
            EditInput::Editor(editor) => next.editor = editor,
        }
        next
    }

    /// Same draft, bound to its parent photo.
    pub fn attached_to(&self, photo_id: PhotoId) -> Self {
        Self {
            photo_id: Some(photo_id),
            ..self.clone()
        }
    }

    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("edit_title".to_string(), self.title.clone()),
            ("edit_text".to_string(), self.text.clone()),
        ];
        if let Some(photo_id) = self.photo_id {
            fields.push(("photo_id".to_string(), photo_id.to_string()));
        }
        for (name, value) in [
            ("editor_name", &self.editor.name),
            ("editor_version", &self.editor.version),
            ("editor_platform", &self.editor.platform),
        ] {
            if !value.is_empty() {
                fields.push((name.to_string(), value.clone()));
            }
        }
        fields
    }
}

impl Default for EditDraft {
    fn default() -> Self {
        Self::new()
    }
}

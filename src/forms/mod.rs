//! Photo-with-edits submission form.
//!
//! - [`draft`]: photo and edit drafts and their input events
//! - [`equipment`]: camera and lens sub-forms backed by the catalog
//! - [`validation`]: submit-time checks
//! - [`composite`]: the state machine tying it together

pub mod composite;
pub mod draft;
pub mod equipment;
pub mod validation;

pub use composite::{photo_path, CompositeForm, FormState, Navigator, SubmitError, Submitted, Submitter};
pub use draft::{Attachment, CameraSettings, DraftId, EditDraft, EditInput, EditorInfo, PhotoDraft, PhotoInput};
pub use equipment::{EquipmentFields, EquipmentInput, EquipmentKind, LensSpecs};
pub use validation::{DraftRef, Issue, ValidationReport};

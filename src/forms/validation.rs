//! Submit-time checks for photo and edit drafts.

use std::fmt;

use thiserror::Error;

use crate::forms::draft::{Attachment, DraftId, EditDraft, PhotoDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Issue {
    #[error("a title or a description is required")]
    MissingDescription,

    /// Neither upload slot holds a file, or both hold the same one.
    #[error("attach at least one file, and not the same file twice")]
    IndistinctFiles,
}

/// Which draft an issue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftRef {
    Photo,
    Edit(DraftId),
}

impl fmt::Display for DraftRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftRef::Photo => f.write_str("photo"),
            DraftRef::Edit(id) => write!(f, "edit {}", id),
        }
    }
}

/// Every failing draft with its issues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub failures: Vec<(DraftRef, Vec<Issue>)>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn issues_for(&self, draft: DraftRef) -> &[Issue] {
        self.failures
            .iter()
            .find(|(r, _)| *r == draft)
            .map(|(_, issues)| issues.as_slice())
            .unwrap_or(&[])
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (draft, issues)) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}:", draft)?;
            for issue in issues {
                write!(f, " {}.", issue)?;
            }
        }
        Ok(())
    }
}

fn check(title: &str, text: &str, file: &Option<Attachment>, preview: &Option<Attachment>) -> Vec<Issue> {
    let mut issues = Vec::new();
    if title.is_empty() && text.is_empty() {
        issues.push(Issue::MissingDescription);
    }
    if file == preview {
        issues.push(Issue::IndistinctFiles);
    }
    issues
}

pub fn validate_photo(photo: &PhotoDraft) -> Vec<Issue> {
    check(&photo.title, &photo.text, &photo.raw_file, &photo.preview_file)
}

pub fn validate_edit(edit: &EditDraft) -> Vec<Issue> {
    check(&edit.title, &edit.text, &edit.sidecar_file, &edit.preview_file)
}

/// Passes only if the photo and every edit pass.
pub fn validate_composite(photo: &PhotoDraft, edits: &[EditDraft]) -> Result<(), ValidationReport> {
    let mut report = ValidationReport::default();

    let issues = validate_photo(photo);
    if !issues.is_empty() {
        report.failures.push((DraftRef::Photo, issues));
    }
    for edit in edits {
        let issues = validate_edit(edit);
        if !issues.is_empty() {
            report.failures.push((DraftRef::Edit(edit.draft_id), issues));
        }
    }

    if report.is_ok() {
        Ok(())
    } else {
        Err(report)
    }
}

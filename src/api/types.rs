//! Wire types shared by the internal and public clients.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned photo identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(pub i64);

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-assigned edit identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditId(pub i64);

impl fmt::Display for EditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// GraphQL `ID` of a manufacturer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManufacturerId(pub String);

/// GraphQL `ID` of a camera body or a lens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquipmentId(pub String);

impl fmt::Display for ManufacturerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EquipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A camera body or lens in the reference catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: EquipmentId,
    pub model: String,
}

/// A manufacturer with its nested cameras and lenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: ManufacturerId,
    pub name: String,
    #[serde(default)]
    pub cameras: Vec<Equipment>,
    #[serde(default)]
    pub lenses: Vec<Equipment>,
}

/// Accepted file extensions per upload slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSupport {
    pub raw_file: Vec<String>,
    pub preview_file: Vec<String>,
    pub edit_file: Vec<String>,
}

impl FileSupport {
    /// `accept` attribute value for a slot, e.g. `.cr3,.nef`.
    pub fn accept(extensions: &[String]) -> String {
        extensions
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Everything the submission form needs to populate its selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub manufacturers: Vec<Manufacturer>,
    #[serde(default)]
    pub file_support: FileSupport,
    /// Where uploads go. Browsers and the CLI post photos and edits here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_api: Option<String>,
}

/// Opaque session credential carried in the `token` cookie.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Basic {}", self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoCreated {
    pub photo_id: PhotoId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCreated {
    pub edit_id: EditId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionVerified {
    pub token: Option<BearerToken>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manufacturer_deserialize() {
        let json = r#"{
            "id": "3",
            "name": "Canon",
            "cameras": [{ "id": "11", "model": "EOS R5" }]
        }"#;
        let mfr: Manufacturer = serde_json::from_str(json).unwrap();
        assert_eq!(mfr.id, ManufacturerId("3".into()));
        assert_eq!(mfr.cameras[0].model, "EOS R5");
        assert!(mfr.lenses.is_empty());
    }

    #[test]
    fn test_created_payloads() {
        let photo: PhotoCreated = serde_json::from_str(r#"{"photoId": 42}"#).unwrap();
        assert_eq!(photo.photo_id, PhotoId(42));
        let edit: EditCreated = serde_json::from_str(r#"{"editId": 7}"#).unwrap();
        assert_eq!(edit.edit_id, EditId(7));
    }

    #[test]
    fn test_token_is_redacted() {
        let token = BearerToken::new("c2VjcmV0OmFAYi5j");
        assert_eq!(format!("{:?}", token), "BearerToken(..)");
        assert_eq!(token.authorization(), "Basic c2VjcmV0OmFAYi5j");
    }

    #[test]
    fn test_accept_attribute() {
        let exts = vec!["cr3".to_string(), "nef".to_string()];
        assert_eq!(FileSupport::accept(&exts), ".cr3,.nef");
    }
}

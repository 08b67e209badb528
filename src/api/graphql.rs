//! GraphQL request envelope and the named operations the site issues.
//!
//! Documents are assembled at compile time from shared field selections.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named GraphQL operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub document: &'static str,
}

/// Body of `POST /graphql`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<'a> {
    pub operation_name: &'a str,
    pub query: &'a str,
    pub variables: Value,
}

impl<'a> GraphQlRequest<'a> {
    pub fn new(op: &'a Operation, variables: Value) -> Self {
        Self {
            operation_name: op.name,
            query: op.document,
            variables,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// `{data, errors}` envelope of a GraphQL response.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

macro_rules! account_name_fields {
    () => {
        " name: accountName safename: accountSafename "
    };
}

macro_rules! preview_fields {
    () => {
        " path: filePath width: imageWidth height: imageHeight "
    };
}

macro_rules! file_fields {
    () => {
        " name: fileName path: filePath ext: fileExtension size: fileSize "
    };
}

macro_rules! reply_fields {
    () => {
        concat!(
            " replies { id: replyId text: replyText createdAt account {",
            account_name_fields!(),
            "} } "
        )
    };
}

macro_rules! photo_fields {
    () => {
        concat!(
            " id: photoId title: photoTitle text: photoText createdAt editedAt",
            " previewFile {", preview_fields!(), "}",
            " rawFile {", file_fields!(), " width: imageWidth height: imageHeight }",
            " edits { id: editId title: editTitle createdAt account {", account_name_fields!(), "}",
            " previewFile {", preview_fields!(), "} }",
            reply_fields!()
        )
    };
}

macro_rules! edit_fields {
    () => {
        concat!(
            " id: editId title: editTitle text: editText createdAt editedAt",
            " previewFile {", preview_fields!(), "}",
            " sidecarFile {", file_fields!(), "}",
            " photo { id: photoId title: photoTitle createdAt account {", account_name_fields!(), "}",
            " previewFile {", preview_fields!(), "} }",
            reply_fields!()
        )
    };
}

pub const PUBLIC_ACCOUNT: Operation = Operation {
    name: "PublicAccount",
    document: concat!(
        "query PublicAccount($accountSafename: String) {",
        " account(accountSafename: $accountSafename) {",
        account_name_fields!(),
        " createdAt",
        " following {", account_name_fields!(), "}",
        " followers {", account_name_fields!(), "}",
        " photos {", photo_fields!(), "}",
        " edits {", edit_fields!(), "}",
        " } }"
    ),
};

pub const MANUFACTURERS: Operation = Operation {
    name: "Manufacturers",
    document: "query Manufacturers { manufacturers { id: manufacturerId name: manufacturerName \
               cameras { id: cameraId model: cameraModel } \
               lenses { id: lensId model: lensModel } } }",
};

pub const PHOTOS: Operation = Operation {
    name: "Photos",
    document: concat!(
        "query Photos { photos {",
        photo_fields!(),
        " account {", account_name_fields!(), " previewFile {", preview_fields!(), "} }",
        " } }"
    ),
};

pub const PHOTO: Operation = Operation {
    name: "Photo",
    document: concat!(
        "query Photo($photoId: ID!) { photo(photoId: $photoId) {",
        photo_fields!(),
        " aperture focalLength iso shutterSpeedDenominator shutterSpeedNumerator",
        " account {", account_name_fields!(), " previewFile {", preview_fields!(), "} }",
        " camera { id: cameraId model: cameraModel manufacturer { id: manufacturerId name: manufacturerName } }",
        " lens { id: lensId model: lensModel manufacturer { id: manufacturerId name: manufacturerName } }",
        " } }"
    ),
};

pub const EDIT: Operation = Operation {
    name: "Edit",
    document: concat!(
        "query Edit($editId: ID!) { edit(editId: $editId) {",
        edit_fields!(),
        " editor { id: editorId name: editorName version: editorVersion platform: editorPlatform }",
        " account {", account_name_fields!(), "}",
        " } }"
    ),
};

//! Presentation records returned by media operations.

use serde::Serialize;

/// Fallback MIME type for unrecognized extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Public description of a stored media file.
///
/// Listing, upload and single-file retrieval all return this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFileResult {
    pub name: String,
    pub size: u64,
    pub folder: String,
    pub url: String,
    pub media_path: String,
    pub mime: String,
}

/// Guesses a MIME type from the extension of `name`.
pub fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

/// One uploaded file, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Per-file result of an upload batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UploadOutcome {
    Uploaded(MediaFileResult),
    Failed {
        name: String,
        size: u64,
        folder: String,
        error: String,
    },
}

impl UploadOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded(_))
    }
}

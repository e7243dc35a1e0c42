use std::time::UNIX_EPOCH;

use medialib_core::{FileEntry, UploadOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: u64,
}

/// A store entry as returned by folder listing and folder creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEntryDto {
    pub name: String,
    pub path: String,
    pub directory_path: String,
    pub is_directory: bool,
    pub length: u64,
    /// Seconds since the Unix epoch.
    pub last_modified: Option<u64>,
}

impl From<&FileEntry> for StoreEntryDto {
    fn from(entry: &FileEntry) -> Self {
        Self {
            name: entry.name().to_string(),
            path: entry.path().to_string(),
            directory_path: entry.directory_path().to_string(),
            is_directory: entry.is_dir(),
            length: entry.length(),
            last_modified: entry
                .modified()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub path: Option<String>,
}

impl PathQuery {
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Deserialize)]
pub struct PathRequest {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    #[serde(default)]
    pub path: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveMediaRequest {
    #[serde(default)]
    pub old_path: String,
    #[serde(default)]
    pub new_path: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteManyRequest {
    pub paths: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveManyRequest {
    pub media_names: Option<Vec<String>>,
    #[serde(default)]
    pub source_folder: String,
    #[serde(default)]
    pub target_folder: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub files: Vec<UploadOutcome>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaIndexResponse {
    pub public_url: String,
    pub max_upload_size_mb: usize,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

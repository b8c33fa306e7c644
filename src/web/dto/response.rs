//! Response DTOs for Web API.
//!
//! Field names are camelCase on the wire.

use serde::Serialize;
use utoipa::ToSchema;

use crate::datetime::{system_time_to_iso, to_iso_millis};
use crate::file::{FileEntry, UploadedFile};

/// Download URL for a stored file.
pub fn download_url(id: &str) -> String {
    format!("/api/download/{}", urlencoding::encode(id))
}

/// Inline view URL for a stored file.
pub fn view_url(id: &str) -> String {
    format!("/api/view/{}", urlencoding::encode(id))
}

/// A freshly uploaded file.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileResponse {
    /// Generated identifier (also the stored filename).
    #[schema(example = "1705314600123-482913441.pdf")]
    pub id: String,
    /// Filename as sent by the client.
    pub original_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Content type declared by the client.
    pub mimetype: String,
    /// Time of the upload request (RFC3339, milliseconds, UTC).
    pub upload_date: String,
    /// Where to download the file.
    pub download_url: String,
}

impl From<UploadedFile> for UploadedFileResponse {
    fn from(file: UploadedFile) -> Self {
        Self {
            download_url: download_url(&file.id),
            upload_date: to_iso_millis(&file.uploaded_at),
            id: file.id,
            original_name: file.original_name,
            size: file.size,
            mimetype: file.mimetype,
        }
    }
}

/// Upload result.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Always `true`.
    pub success: bool,
    /// The stored file.
    pub file: UploadedFileResponse,
}

impl UploadResponse {
    /// Wrap an uploaded file.
    pub fn new(file: UploadedFile) -> Self {
        Self {
            success: true,
            file: file.into(),
        }
    }
}

/// Metadata of a stored file, as returned by listing and info.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileInfoResponse {
    /// Identifier.
    pub id: String,
    /// Stored filename (same as `id`).
    pub filename: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time (RFC3339, milliseconds, UTC).
    pub upload_date: String,
    /// Where to download the file.
    pub download_url: String,
    /// Where to view the file inline.
    pub view_url: String,
}

impl From<FileEntry> for FileInfoResponse {
    fn from(entry: FileEntry) -> Self {
        Self {
            filename: entry.id.clone(),
            size: entry.size,
            upload_date: system_time_to_iso(entry.modified),
            download_url: download_url(&entry.id),
            view_url: view_url(&entry.id),
            id: entry.id,
        }
    }
}

/// Delete result.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation message.
    pub message: String,
}

impl DeleteResponse {
    /// Confirmation for a deleted file.
    pub fn deleted() -> Self {
        Self {
            success: true,
            message: "File deleted".to_string(),
        }
    }
}

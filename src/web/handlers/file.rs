//! File handlers for Web API.

use axum::{
    body::Body,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::Response,
    Json,
};
use futures::TryStreamExt;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use utoipa::ToSchema;

use crate::file::DEFAULT_MIME_TYPE;
use crate::web::dto::{DeleteResponse, FileInfoResponse, UploadResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::FileboxError;

/// Multipart form accepted by the upload endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadForm {
    /// The file to store.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Generate a safe `Content-Disposition: attachment` value.
///
/// Control characters are stripped, quotes and backslashes in the plain
/// `filename` are replaced, and non-ASCII names get an RFC 5987 `filename*`.
fn content_disposition_header(filename: &str) -> String {
    let needs_encoding = !filename.is_ascii()
        || filename
            .chars()
            .any(|c| c.is_control() || c == '"' || c == '\\');

    if !needs_encoding {
        return format!("attachment; filename=\"{filename}\"");
    }

    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

/// Map a multipart decoding error, recognising the request body limit.
fn multipart_error(err: MultipartError, max_upload_size: u64) -> FileboxError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        FileboxError::SizeLimitExceeded(max_upload_size)
    } else {
        FileboxError::InvalidUpload(err.body_text())
    }
}

/// POST /api/upload - Upload a file.
///
/// Request body: multipart/form-data with a `file` part. Other parts, and any
/// `file` part after the first, are ignored.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "files",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded", body = UploadResponse),
        (status = 400, description = "No file provided or malformed body", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Upload without multipart body: {}", e);
        FileboxError::NoFileProvided
    })?;
    let max_upload_size = state.max_upload_size;

    let mut uploaded = None;

    // The rest of the body is not read once a file is stored.
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_upload_size))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let mimetype = field
            .content_type()
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        let body = field.map_err(|e| multipart_error(e, max_upload_size));
        let file = state
            .store
            .put(body, &original_name, &mimetype, max_upload_size)
            .await?;

        tracing::info!(
            id = %file.id,
            original_name = %file.original_name,
            size = file.size,
            "File uploaded"
        );
        uploaded = Some(file);
        break;
    }

    let file = uploaded.ok_or(FileboxError::NoFileProvided)?;
    Ok(Json(UploadResponse::new(file)))
}

/// GET /api/files - List all stored files.
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    responses(
        (status = 200, description = "Stored files, unordered", body = Vec<FileInfoResponse>),
        (status = 500, description = "Storage directory unreadable", body = ErrorBody)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FileInfoResponse>>, ApiError> {
    let entries = state.store.list().await?;
    Ok(Json(entries.into_iter().map(FileInfoResponse::from).collect()))
}

/// GET /api/files/:filename/info - Get file metadata.
#[utoipa::path(
    get,
    path = "/api/files/{filename}/info",
    tag = "files",
    params(
        ("filename" = String, Path, description = "File identifier")
    ),
    responses(
        (status = 200, description = "File metadata", body = FileInfoResponse),
        (status = 400, description = "Invalid identifier", body = ErrorBody),
        (status = 404, description = "File not found", body = ErrorBody)
    )
)]
pub async fn get_file_info(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<FileInfoResponse>, ApiError> {
    let entry = state.store.stat(&filename).await?;
    Ok(Json(entry.into()))
}

/// Stream a stored file, optionally as an attachment.
async fn file_response(
    state: &AppState,
    filename: &str,
    attachment: bool,
) -> Result<Response<Body>, ApiError> {
    let (file, entry) = state.store.open_read(filename).await?;

    let content_type = mime_guess::from_path(&entry.id)
        .first_or_octet_stream()
        .to_string();

    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, entry.size);

    if attachment {
        builder = builder.header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&entry.id),
        );
    }

    builder
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// GET /api/download/:filename - Download a file as an attachment.
#[utoipa::path(
    get,
    path = "/api/download/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "File identifier")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid identifier", body = ErrorBody),
        (status = 404, description = "File not found", body = ErrorBody)
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response<Body>, ApiError> {
    file_response(&state, &filename, true).await
}

/// GET /api/view/:filename - Serve a file inline (e.g. image preview).
#[utoipa::path(
    get,
    path = "/api/view/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "File identifier")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid identifier", body = ErrorBody),
        (status = 404, description = "File not found", body = ErrorBody)
    )
)]
pub async fn view_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response<Body>, ApiError> {
    file_response(&state, &filename, false).await
}

/// DELETE /api/files/:filename - Delete a file.
#[utoipa::path(
    delete,
    path = "/api/files/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "File identifier")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 400, description = "Invalid identifier", body = ErrorBody),
        (status = 404, description = "File not found", body = ErrorBody)
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.store.delete(&filename).await?;
    Ok(Json(DeleteResponse::deleted()))
}

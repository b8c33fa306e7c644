//! File storage module for Filebox.
//!
//! This module provides the flat, filesystem-backed file store:
//! - Identifier generation (`<unix-millis>-<random>.<ext>`)
//! - Streaming uploads through a staging area
//! - Listing, stat, read and delete with identifiers confined to the store root

mod metadata;
mod storage;
mod upload;

pub use metadata::{extract_extension, generate_file_id, validate_file_id, FileEntry, UploadedFile};
pub use storage::{FileStore, STAGING_DIR};
pub use upload::PendingUpload;

/// Default maximum upload size (100MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 100 * 1024 * 1024;

/// Content type recorded when the client does not declare one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

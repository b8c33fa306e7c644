//! Stored file metadata and identifier generation.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::{FileboxError, Result};

/// Upper bound (inclusive) of the random identifier suffix.
const RANDOM_SUFFIX_MAX: u32 = 1_000_000_000;

/// A file as seen by listing or stat: identity plus live filesystem metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Stored filename, which is also the identifier.
    pub id: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
}

/// Result of a successful upload.
///
/// `original_name` and `mimetype` are only known at upload time; they are
/// not persisted anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Generated identifier.
    pub id: String,
    /// Client-supplied filename.
    pub original_name: String,
    /// Bytes written.
    pub size: u64,
    /// Client-declared content type.
    pub mimetype: String,
    /// Wall-clock time the upload started.
    pub uploaded_at: DateTime<Utc>,
}

/// Generate a new identifier: `<unix-millis>-<random>` plus the original extension.
pub fn generate_file_id(original_name: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let suffix = rand::rng().random_range(0..=RANDOM_SUFFIX_MAX);
    format!("{millis}-{suffix}{}", extract_extension(original_name))
}

/// Extension of `original_name` including its leading dot, or `""` if none.
///
/// The extension is kept as the client sent it, except that one containing a
/// character that can never appear in an identifier is dropped.
pub fn extract_extension(original_name: &str) -> String {
    match Path::new(original_name).extension().and_then(|s| s.to_str()) {
        Some(ext) if !ext.contains(['\\', '\0']) => format!(".{ext}"),
        _ => String::new(),
    }
}

/// Check that an identifier names a single entry directly under the store root.
///
/// Rejects empty names, path separators, NUL, `.`/`..` and hidden names
/// (the staging area lives under a hidden directory).
pub fn validate_file_id(id: &str) -> Result<()> {
    let invalid = id.is_empty()
        || id.starts_with('.')
        || id.contains(['/', '\\', '\0']);

    if invalid {
        return Err(FileboxError::InvalidIdentifier(id.to_string()));
    }
    Ok(())
}

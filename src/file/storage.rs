//! Filesystem-backed file store.
//!
//! The store is a flat directory; each file's name is its identifier:
//! ```text
//! {root}/
//! ├── .incoming/                    (staging area for uploads in progress)
//! ├── 1705314600123-482913441.pdf
//! └── 1705314601877-90210.png
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use futures::{Stream, StreamExt};
use tokio::fs::{File, OpenOptions};

use super::metadata::{generate_file_id, validate_file_id, FileEntry, UploadedFile};
use super::upload::PendingUpload;
use crate::{FileboxError, Result};

/// Name of the staging directory under the store root.
pub const STAGING_DIR: &str = ".incoming";

/// Attempts at drawing an identifier that is not already taken.
const MAX_ID_ATTEMPTS: usize = 8;

/// Handle to the upload directory.
///
/// Holds no state beyond its paths; the filesystem is the source of truth.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Root directory as configured.
    root: PathBuf,
    /// Canonical form of `root`, used for containment checks.
    canonical_root: PathBuf,
    /// Staging directory for uploads in progress.
    staging: PathBuf,
}

impl FileStore {
    /// Open the store at `root`, creating the directory if it doesn't exist.
    ///
    /// Staging files left behind by an interrupted process are removed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let staging = root.join(STAGING_DIR);
        fs::create_dir_all(&staging)?;

        let canonical_root = fs::canonicalize(&root)?;

        let store = Self {
            root,
            canonical_root,
            staging,
        };

        let removed = store.purge_staging()?;
        if removed > 0 {
            tracing::info!(removed, "Removed stale staging files");
        }

        Ok(store)
    }

    /// Get the root path of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn purge_staging(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.staging)?.flatten() {
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false)
                && fs::remove_file(entry.path()).is_ok()
            {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Start a streaming upload.
    ///
    /// The identifier is generated from `original_name`'s extension and
    /// re-drawn if a stored or staged file already uses it.
    pub async fn begin(
        &self,
        original_name: &str,
        mimetype: &str,
        max_size: u64,
    ) -> Result<PendingUpload> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = generate_file_id(original_name);
            let final_path = self.root.join(&id);

            if tokio::fs::try_exists(&final_path).await? {
                continue;
            }

            let staging_path = self.staging.join(&id);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&staging_path)
                .await
            {
                Ok(file) => {
                    return Ok(PendingUpload::new(
                        id,
                        original_name,
                        mimetype,
                        staging_path,
                        final_path,
                        file,
                        max_size,
                    ));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(FileboxError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "could not allocate a unique file id",
        )))
    }

    /// Store the content of `body` as a new file.
    ///
    /// Fails with [`FileboxError::SizeLimitExceeded`] once more than
    /// `max_size` bytes arrive. On any failure nothing is left in the store.
    pub async fn put<S, B>(
        &self,
        body: S,
        original_name: &str,
        mimetype: &str,
        max_size: u64,
    ) -> Result<UploadedFile>
    where
        S: Stream<Item = Result<B>>,
        B: AsRef<[u8]>,
    {
        let mut upload = self.begin(original_name, mimetype, max_size).await?;
        let mut body = std::pin::pin!(body);

        while let Some(chunk) = body.next().await {
            upload.write(chunk?.as_ref()).await?;
        }

        upload.commit().await
    }

    /// List all stored files, in directory enumeration order.
    ///
    /// Hidden entries and anything that is not a regular file are skipped.
    pub async fn list(&self) -> Result<Vec<FileEntry>> {
        let unavailable = |e: io::Error| {
            FileboxError::StorageUnavailable(format!("{}: {e}", self.root.display()))
        };

        let mut dir = tokio::fs::read_dir(&self.root).await.map_err(unavailable)?;
        let mut entries = Vec::new();

        while let Some(entry) = dir.next_entry().await.map_err(unavailable)? {
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!("Skipping non UTF-8 entry {}", entry.path().display());
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let file_type = match entry.file_type().await {
                Ok(t) => t,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(unavailable(e)),
            };
            // Symlinks are listed only if they resolve inside the root.
            if file_type.is_symlink() && self.resolve(&name).await.is_err() {
                continue;
            }

            let metadata = match tokio::fs::metadata(entry.path()).await {
                Ok(m) => m,
                // Deleted between readdir and stat
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(unavailable(e)),
            };
            if !metadata.is_file() {
                continue;
            }

            entries.push(FileEntry {
                id: name,
                size: metadata.len(),
                modified: metadata.modified().map_err(unavailable)?,
            });
        }

        Ok(entries)
    }

    /// Resolve an identifier to the canonical path of an existing entry.
    ///
    /// The resolved path must stay inside the store root after following
    /// symlinks.
    pub async fn resolve(&self, id: &str) -> Result<PathBuf> {
        validate_file_id(id)?;

        let candidate = self.root.join(id);
        let canonical = match tokio::fs::canonicalize(&candidate).await {
            Ok(path) => path,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FileboxError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if !canonical.starts_with(&self.canonical_root) {
            tracing::warn!(id, "Rejected identifier resolving outside the store root");
            return Err(FileboxError::InvalidIdentifier(id.to_string()));
        }

        Ok(canonical)
    }

    /// Get metadata for a single file.
    pub async fn stat(&self, id: &str) -> Result<FileEntry> {
        let path = self.resolve(id).await?;
        let metadata = tokio::fs::metadata(&path).await.map_err(|e| not_found_or_io(e, id))?;

        if !metadata.is_file() {
            return Err(FileboxError::NotFound(id.to_string()));
        }

        Ok(FileEntry {
            id: id.to_string(),
            size: metadata.len(),
            modified: metadata.modified()?,
        })
    }

    /// Open a file for reading, together with its metadata.
    pub async fn open_read(&self, id: &str) -> Result<(File, FileEntry)> {
        let entry = self.stat(id).await?;
        let path = self.resolve(id).await?;
        let file = File::open(&path).await.map_err(|e| not_found_or_io(e, id))?;
        Ok((file, entry))
    }

    /// Delete a file.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = self.resolve(id).await?;
        let metadata = tokio::fs::metadata(&path).await.map_err(|e| not_found_or_io(e, id))?;
        if !metadata.is_file() {
            return Err(FileboxError::NotFound(id.to_string()));
        }

        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or_io(e, id))?;

        tracing::info!(id, "File deleted");
        Ok(())
    }
}

fn not_found_or_io(e: io::Error, id: &str) -> FileboxError {
    if e.kind() == io::ErrorKind::NotFound {
        FileboxError::NotFound(id.to_string())
    } else {
        e.into()
    }
}

//! Streaming upload writer.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::metadata::UploadedFile;
use crate::{FileboxError, Result};

/// An upload in progress.
///
/// Bytes are written to a staging file outside the visible namespace and
/// moved into place by [`PendingUpload::commit`]. If the value is dropped
/// without being committed, the staging file is removed.
#[derive(Debug)]
pub struct PendingUpload {
    id: String,
    original_name: String,
    mimetype: String,
    staging_path: PathBuf,
    final_path: PathBuf,
    file: Option<File>,
    written: u64,
    max_size: u64,
    started_at: DateTime<Utc>,
    committed: bool,
}

impl PendingUpload {
    pub(crate) fn new(
        id: String,
        original_name: &str,
        mimetype: &str,
        staging_path: PathBuf,
        final_path: PathBuf,
        file: File,
        max_size: u64,
    ) -> Self {
        Self {
            id,
            original_name: original_name.to_string(),
            mimetype: mimetype.to_string(),
            staging_path,
            final_path,
            file: Some(file),
            written: 0,
            max_size,
            started_at: Utc::now(),
            committed: false,
        }
    }

    /// The identifier the file will be stored under.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Append a chunk.
    ///
    /// Fails with [`FileboxError::SizeLimitExceeded`] without writing anything
    /// if the chunk would take the upload past its ceiling.
    pub async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        let total = self.written.saturating_add(chunk.len() as u64);
        if total > self.max_size {
            return Err(FileboxError::SizeLimitExceeded(self.max_size));
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| FileboxError::InvalidUpload("upload already finished".to_string()))?;
        file.write_all(chunk).await?;
        self.written = total;

        Ok(())
    }

    /// Flush the staging file and move it to its final name.
    pub async fn commit(mut self) -> Result<UploadedFile> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
            file.sync_all().await?;
        }

        tokio::fs::rename(&self.staging_path, &self.final_path).await?;
        self.committed = true;

        tracing::debug!(id = %self.id, size = self.written, "Upload committed");

        Ok(UploadedFile {
            id: std::mem::take(&mut self.id),
            original_name: std::mem::take(&mut self.original_name),
            size: self.written,
            mimetype: std::mem::take(&mut self.mimetype),
            uploaded_at: self.started_at,
        })
    }
}

impl Drop for PendingUpload {
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        // Close the handle before unlinking.
        drop(self.file.take());

        match std::fs::remove_file(&self.staging_path) {
            Ok(()) => tracing::debug!(id = %self.id, "Discarded incomplete upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                id = %self.id,
                error = %e,
                "Failed to remove staging file {}",
                self.staging_path.display()
            ),
        }
    }
}

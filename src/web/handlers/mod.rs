//! API handlers for the file service.

pub mod file;

pub use file::*;

use crate::file::{FileStore, DEFAULT_MAX_UPLOAD_SIZE};

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The upload directory.
    pub store: FileStore,
    /// Upload ceiling in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    /// Create state around an opened store with the default upload ceiling.
    pub fn new(store: FileStore) -> Self {
        Self {
            store,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    /// Set the upload ceiling in bytes.
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }
}

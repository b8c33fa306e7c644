//! Filebox - a minimal file storage HTTP service.
//!
//! Files are uploaded over HTTP, stored flat in a local directory under a
//! generated name, and listed, downloaded, viewed and deleted by that name.

pub mod config;
pub mod datetime;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use error::{FileboxError, Result};
pub use file::{FileEntry, FileStore, PendingUpload, UploadedFile};
pub use web::WebServer;

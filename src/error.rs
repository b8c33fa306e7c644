//! Error types for Filebox.

use thiserror::Error;

/// Common error type for Filebox.
#[derive(Error, Debug)]
pub enum FileboxError {
    /// The upload request carried no `file` part.
    #[error("no file provided")]
    NoFileProvided,

    /// The uploaded content exceeded the configured ceiling (in bytes).
    #[error("file exceeds the upload limit of {0} bytes")]
    SizeLimitExceeded(u64),

    /// The identifier is malformed or resolves outside the storage root.
    #[error("invalid file identifier: {0}")]
    InvalidIdentifier(String),

    /// No stored file with the given identifier.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The storage directory could not be read.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The upload body could not be decoded.
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for Filebox operations.
pub type Result<T> = std::result::Result<T, FileboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error_display() {
        let err = FileboxError::NotFound("123-456.txt".to_string());
        assert_eq!(err.to_string(), "file not found: 123-456.txt");
    }

    #[test]
    fn test_size_limit_error_display() {
        let err = FileboxError::SizeLimitExceeded(1024);
        assert_eq!(err.to_string(), "file exceeds the upload limit of 1024 bytes");
    }

    #[test]
    fn test_invalid_identifier_display() {
        let err = FileboxError::InvalidIdentifier("..".to_string());
        assert_eq!(err.to_string(), "invalid file identifier: ..");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: FileboxError = io_err.into();
        assert!(matches!(err, FileboxError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<u64> {
            Ok(42)
        }

        fn sample_err() -> Result<u64> {
            Err(FileboxError::NoFileProvided)
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}

//! Error types for archive operations

use datakeep_domain::StoreError;
use thiserror::Error;

/// Errors that can occur during archive operations
///
/// Per-artifact failures never surface here; the job absorbs them into the
/// cycle report so one bad artifact cannot stop a cycle. This type covers
/// the failures that stop a cycle or a worker outright.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// A tier operation outside per-artifact isolation failed
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration prevents the job or worker from starting
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A collector task could not be joined
    #[error("Worker error: {0}")]
    Worker(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ArchiveError::Configuration("archive_time must be HH:MM".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: archive_time must be HH:MM"
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let store = StoreError::Transient("connection reset".to_string());
        let err: ArchiveError = store.into();
        assert!(matches!(err, ArchiveError::Store(_)));
        assert!(err.to_string().contains("connection reset"));
    }
}

//! Error types for the command-line interface

use datakeep_archiver::ArchiveError;
use datakeep_domain::StoreError;
use datakeep_scheduler::SchedulerError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Environment configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage tier error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Archive service error
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Scheduler error
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

//! Configuration for archive operations
//!
//! Defines the retention window, the daily trigger, and retry behavior for
//! remote transfers.

use chrono::NaiveTime;
use datakeep_domain::RetentionPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ArchiveError;
use crate::retry::RetryPolicy;

/// Configuration for the archive service
///
/// Controls retention, the daily trigger time, collector concurrency, and
/// retry behavior for store operations.
///
/// # Examples
///
/// ```
/// use datakeep_archiver::ArchiveConfig;
///
/// // Default configuration (7-day retention, 03:00 trigger)
/// let config = ArchiveConfig::default();
/// assert_eq!(config.retention_days, 7);
///
/// // Archival switched off entirely
/// let config = ArchiveConfig::disabled();
/// assert!(!config.enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Whether the archive job runs at all
    /// Default: true
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Calendar days an artifact stays on the local tier
    /// Default: 7
    pub retention_days: u32,

    /// Local wall-clock time of the daily run, "HH:MM"
    /// Default: "03:00"
    pub archive_time: String,

    /// Collectors migrated in parallel within one cycle
    /// Default: 4
    pub max_concurrent_collectors: usize,

    /// Attempts per store operation before an artifact is marked failed
    /// Default: 3
    pub max_attempts: u32,

    /// Backoff after the first failed attempt (in milliseconds), doubled
    /// per retry
    /// Default: 500
    pub base_delay_ms: u64,

    /// Upper bound on backoff between attempts (in milliseconds)
    /// Default: 10000
    pub max_delay_ms: u64,

    /// Wall-clock limit for a single store operation attempt (in seconds)
    /// Default: 30
    pub attempt_timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}

impl Default for ArchiveConfig {
    /// Create default configuration matching the nightly production setup
    ///
    /// - Retention: 7 calendar days on the local tier
    /// - Trigger: 03:00 local time
    /// - Concurrency: 4 collectors at a time
    /// - Retries: 3 attempts, 500ms base backoff, 10s cap, 30s per attempt
    fn default() -> Self {
        Self {
            enabled: true,
            retention_days: 7,
            archive_time: "03:00".to_string(),
            max_concurrent_collectors: 4,
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
            attempt_timeout_secs: 30,
        }
    }
}

impl ArchiveConfig {
    /// Configuration with archival switched off
    ///
    /// The worker parks until shutdown and scheduled cycles never run;
    /// everything stays on the local tier indefinitely.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Retention window as a policy value
    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy::new(self.retention_days)
    }

    /// Parsed daily trigger time, `None` if `archive_time` is not `HH:MM`
    pub fn trigger_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.archive_time, "%H:%M").ok()
    }

    /// Get base backoff as Duration
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Get backoff cap as Duration
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Get per-attempt timeout as Duration
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Retry schedule applied to store operations
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: self.base_delay(),
            max_delay: self.max_delay(),
            attempt_timeout: self.attempt_timeout(),
        }
    }

    /// Check the configuration for values the job cannot run with
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::Configuration` when `archive_time` does not
    /// parse, or when attempts or concurrency are zero.
    pub fn validate(&self) -> Result<(), ArchiveError> {
        if self.trigger_time().is_none() {
            return Err(ArchiveError::Configuration(format!(
                "archive_time '{}' is not HH:MM",
                self.archive_time
            )));
        }
        if self.max_attempts == 0 {
            return Err(ArchiveError::Configuration(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent_collectors == 0 {
            return Err(ArchiveError::Configuration(
                "max_concurrent_collectors must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

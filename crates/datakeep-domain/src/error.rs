//! Error taxonomy shared by every storage tier

use thiserror::Error;

/// Errors surfaced by Artifact Store operations
///
/// Callers branch on the category, never on backend detail: the archive job
/// retries `Transient` and `IntegrityViolation`, treats `NotFound` and
/// `InvalidKey` as final, and refuses to start archival on `Configuration`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key not present in the queried tier
    #[error("Not found: {key}")]
    NotFound {
        /// The `collector/relative_path` key that missed
        key: String,
    },

    /// Network or IO failure that may succeed on retry
    #[error("Transient store error: {0}")]
    Transient(String),

    /// Tier misconfiguration, detected at startup or on first use
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An upload reported success but the key could not be verified afterwards
    #[error("Integrity violation: upload of {key} not verified")]
    IntegrityViolation {
        /// The key whose post-upload existence check failed
        key: String,
    },

    /// Malformed collector name or relative path
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl StoreError {
    /// Build a `NotFound` from a `collector/relative_path` pair
    pub fn not_found(collector: &str, relative: &str) -> Self {
        Self::NotFound {
            key: format!("{}/{}", collector, relative),
        }
    }

    /// Build an `IntegrityViolation` from a `collector/relative_path` pair
    pub fn unverified(collector: &str, relative: &str) -> Self {
        Self::IntegrityViolation {
            key: format!("{}/{}", collector, relative),
        }
    }

    /// Map a filesystem error for `key`; `ErrorKind::NotFound` becomes
    /// [`StoreError::NotFound`], everything else is transient
    pub fn from_io(err: std::io::Error, key: &str) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound {
                key: key.to_string(),
            }
        } else {
            Self::Transient(format!("{}: {}", key, err))
        }
    }

    /// Whether a retry of the failed operation might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Transient(_) | StoreError::IntegrityViolation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_categories() {
        assert!(StoreError::Transient("timeout".to_string()).is_retryable());
        assert!(StoreError::unverified("prices", "2025/12/19/a.json").is_retryable());

        assert!(!StoreError::not_found("prices", "2025/12/19/a.json").is_retryable());
        assert!(!StoreError::Configuration("no bucket".to_string()).is_retryable());
        assert!(!StoreError::InvalidKey("..".to_string()).is_retryable());
    }

    #[test]
    fn test_io_mapping() {
        let missing = std::io::Error::from(std::io::ErrorKind::NotFound);
        match StoreError::from_io(missing, "prices/2025/12/19/a.json") {
            StoreError::NotFound { key } => assert_eq!(key, "prices/2025/12/19/a.json"),
            other => panic!("expected NotFound, got {:?}", other),
        }

        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(
            StoreError::from_io(denied, "prices/2025/12/19/a.json"),
            StoreError::Transient(_)
        ));
    }
}

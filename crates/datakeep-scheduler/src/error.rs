//! Error types for collector scheduling

use thiserror::Error;

/// Errors that can occur while registering or driving collectors
///
/// Collector run failures never surface here; the scheduler logs and counts
/// them so one bad upstream cannot stop the loop. This type covers the
/// failures that prevent the scheduler from being assembled or driven.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// A collector could not be registered
    #[error("Registry error: {0}")]
    Registry(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SchedulerError::Registry("collector 'prices' is already registered".to_string());
        assert_eq!(
            err.to_string(),
            "Registry error: collector 'prices' is already registered"
        );
    }
}

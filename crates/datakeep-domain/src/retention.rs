//! Retention policy - which partition dates may leave the local tier

use chrono::NaiveDate;

use crate::path::PartitionDate;

/// Calendar-day retention window for the local tier
///
/// An artifact is eligible for archival once its partition date is at least
/// `retention_days` calendar days behind the evaluation date. The arithmetic
/// is whole calendar days, never elapsed hours, so eligibility flips at
/// midnight in the evaluating timezone and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    retention_days: u32,
}

impl RetentionPolicy {
    /// Create a policy keeping `retention_days` days in the local tier
    ///
    /// Zero is valid and makes every partition up to and including today
    /// eligible.
    pub fn new(retention_days: u32) -> Self {
        Self { retention_days }
    }

    /// The configured window size in days
    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Whether a partition is old enough to migrate, evaluated at `today`
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use datakeep_domain::{PartitionDate, RetentionPolicy};
    ///
    /// let policy = RetentionPolicy::new(7);
    /// let today = NaiveDate::from_ymd_opt(2025, 12, 27).unwrap();
    /// let partition = PartitionDate::from_ymd(2025, 12, 20).unwrap();
    /// assert!(policy.is_eligible(partition, today));
    /// ```
    pub fn is_eligible(&self, partition: PartitionDate, today: NaiveDate) -> bool {
        let age_days = (today - partition.date()).num_days();
        age_days >= i64::from(self.retention_days)
    }
}

//! Artifact metadata as reported by storage tiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::path::{ArtifactPath, PartitionDate};

/// Metadata for one stored artifact
///
/// Size and modification time are whatever the owning tier reports; the key
/// is validated, so a meta always carries a well-formed partition date.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactMeta {
    /// Owning collector namespace
    pub collector: String,

    /// Validated relative key within the collector
    pub path: ArtifactPath,

    /// Payload size in bytes
    pub size_bytes: u64,

    /// Tier-reported last modification time
    pub last_modified: DateTime<Utc>,
}

impl ArtifactMeta {
    /// The calendar date this artifact is partitioned under
    pub fn partition_date(&self) -> PartitionDate {
        self.path.date()
    }

    /// Full `collector/relative_path` key
    pub fn key(&self) -> String {
        format!("{}/{}", self.collector, self.path.relative())
    }
}

/// Aggregate file count and byte total for one collector in one tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierStat {
    /// Number of artifacts (the `latest` alias is not counted)
    pub file_count: u64,

    /// Sum of artifact sizes in bytes
    pub total_bytes: u64,
}

impl TierStat {
    /// Account for one artifact
    pub fn record(&mut self, size_bytes: u64) {
        self.file_count += 1;
        self.total_bytes += size_bytes;
    }

    /// Byte total in mebibytes, for human-facing output
    pub fn megabytes(&self) -> f64 {
        self.total_bytes as f64 / (1024.0 * 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_key_and_date() {
        let meta = ArtifactMeta {
            collector: "prices".to_string(),
            path: ArtifactPath::parse("2025/12/19/prices_0300.json").unwrap(),
            size_bytes: 128,
            last_modified: Utc::now(),
        };

        assert_eq!(meta.key(), "prices/2025/12/19/prices_0300.json");
        assert_eq!(meta.partition_date().to_string(), "2025-12-19");
    }

    #[test]
    fn test_tier_stat_accumulation() {
        let mut stat = TierStat::default();
        stat.record(1024 * 1024);
        stat.record(1024 * 1024);

        assert_eq!(stat.file_count, 2);
        assert_eq!(stat.total_bytes, 2 * 1024 * 1024);
        assert!((stat.megabytes() - 2.0).abs() < f64::EPSILON);
    }
}

//! Status reporting over both tiers and the archive job

use std::sync::Arc;

use datakeep_archiver::{ArchiveConfig, CycleReport, ReportSlot};
use datakeep_domain::{ArtifactStore, StoreError, TierStat};
use serde::{Deserialize, Serialize};

/// Tier usage for one collector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorStat {
    /// Collector namespace
    pub collector: String,

    /// Artifact count on the local tier
    pub local_file_count: u64,

    /// Bytes on the local tier
    pub local_size_bytes: u64,

    /// Artifact count on the remote tier
    pub remote_file_count: u64,

    /// Bytes on the remote tier
    pub remote_size_bytes: u64,
}

/// Snapshot of archival configuration and activity
///
/// Serialized as-is for operator-facing surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveStatus {
    /// Whether scheduled archival is enabled
    pub enabled: bool,

    /// Whether a remote tier is configured
    pub remote_configured: bool,

    /// Local retention window in calendar days
    pub retention_days: u32,

    /// Daily trigger time, HH:MM local
    pub archive_time: String,

    /// Most recent completed cycle, if one has run since startup
    pub last_cycle: Option<CycleReport>,

    /// Per-collector usage across both tiers
    pub collectors: Vec<CollectorStat>,
}

/// Builds status snapshots from the tiers and the archive report slot
///
/// With no remote tier configured every remote counter reports zero and
/// `remote_configured` is false; that is a valid local-only deployment,
/// not an error.
pub struct StatusReporter {
    local: Arc<dyn ArtifactStore>,
    remote: Option<Arc<dyn ArtifactStore>>,
    config: ArchiveConfig,
    reports: ReportSlot,
}

impl StatusReporter {
    /// Create a reporter over the given tiers
    ///
    /// `reports` should be the slot handed out by the archive job so
    /// `last_cycle` reflects its most recent run.
    pub fn new(
        local: Arc<dyn ArtifactStore>,
        remote: Option<Arc<dyn ArtifactStore>>,
        config: ArchiveConfig,
        reports: ReportSlot,
    ) -> Self {
        Self {
            local,
            remote,
            config,
            reports,
        }
    }

    /// Tier usage for every collector known to either tier
    pub async fn collector_stats(&self) -> Result<Vec<CollectorStat>, StoreError> {
        let mut names = self.local.list_collectors().await?;
        if let Some(remote) = &self.remote {
            names.extend(remote.list_collectors().await?);
        }
        names.sort();
        names.dedup();

        let mut stats = Vec::with_capacity(names.len());
        for name in names {
            let local = self.local.stat(&name).await?;
            let remote = match &self.remote {
                Some(remote) => remote.stat(&name).await?,
                None => TierStat::default(),
            };
            stats.push(CollectorStat {
                collector: name,
                local_file_count: local.file_count,
                local_size_bytes: local.total_bytes,
                remote_file_count: remote.file_count,
                remote_size_bytes: remote.total_bytes,
            });
        }
        Ok(stats)
    }

    /// Full archival status snapshot
    pub async fn archive_status(&self) -> Result<ArchiveStatus, StoreError> {
        Ok(ArchiveStatus {
            enabled: self.config.enabled,
            remote_configured: self.remote.is_some(),
            retention_days: self.config.retention_days,
            archive_time: self.config.archive_time.clone(),
            last_cycle: self.reports.latest(),
            collectors: self.collector_stats().await?,
        })
    }

    /// The most recent cycle report without tier queries
    pub fn last_cycle(&self) -> Option<CycleReport> {
        self.reports.latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datakeep_store::MemoryStore;

    async fn seed(store: &MemoryStore, collector: &str, relative: &str, size: usize) {
        store
            .put(collector, relative, vec![0u8; size], "application/json")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stats_cover_union_of_tiers() {
        let local = Arc::new(MemoryStore::new());
        let remote = Arc::new(MemoryStore::new());
        seed(&local, "prices", "2025/12/26/prices_0300.json", 100).await;
        seed(&remote, "prices", "2025/12/19/prices_0300.json", 40).await;
        seed(&remote, "weather", "2025/12/19/weather_0300.json", 7).await;

        let reporter = StatusReporter::new(
            local,
            Some(remote),
            ArchiveConfig::default(),
            ReportSlot::new(),
        );
        let stats = reporter.collector_stats().await.unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].collector, "prices");
        assert_eq!(stats[0].local_file_count, 1);
        assert_eq!(stats[0].local_size_bytes, 100);
        assert_eq!(stats[0].remote_file_count, 1);
        assert_eq!(stats[0].remote_size_bytes, 40);

        // known only to the remote tier, still reported
        assert_eq!(stats[1].collector, "weather");
        assert_eq!(stats[1].local_file_count, 0);
        assert_eq!(stats[1].remote_file_count, 1);
    }

    #[tokio::test]
    async fn test_local_only_mode_reports_zeros() {
        let local = Arc::new(MemoryStore::new());
        seed(&local, "prices", "2025/12/26/prices_0300.json", 10).await;

        let reporter = StatusReporter::new(
            local,
            None,
            ArchiveConfig::disabled(),
            ReportSlot::new(),
        );
        let status = reporter.archive_status().await.unwrap();

        assert!(!status.enabled);
        assert!(!status.remote_configured);
        assert!(status.last_cycle.is_none());
        assert_eq!(status.collectors.len(), 1);
        assert_eq!(status.collectors[0].remote_file_count, 0);
        assert_eq!(status.collectors[0].remote_size_bytes, 0);
    }

    #[tokio::test]
    async fn test_status_carries_last_cycle() {
        let slot = ReportSlot::new();
        let report = CycleReport::new();
        slot.publish(report.clone());

        let reporter = StatusReporter::new(
            Arc::new(MemoryStore::new()),
            None,
            ArchiveConfig::default(),
            slot,
        );

        let status = reporter.archive_status().await.unwrap();
        assert_eq!(status.last_cycle.unwrap().run_id, report.run_id);
        assert_eq!(reporter.last_cycle().unwrap().run_id, report.run_id);
    }

    #[tokio::test]
    async fn test_status_serializes_for_operators() {
        let reporter = StatusReporter::new(
            Arc::new(MemoryStore::new()),
            None,
            ArchiveConfig::default(),
            ReportSlot::new(),
        );

        let status = reporter.archive_status().await.unwrap();
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["enabled"], true);
        assert_eq!(json["remote_configured"], false);
        assert_eq!(json["retention_days"], 7);
        assert_eq!(json["archive_time"], "03:00");
        assert!(json["last_cycle"].is_null());
    }
}

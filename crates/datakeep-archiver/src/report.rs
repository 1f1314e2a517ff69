//! Cycle reports for archive operations
//!
//! Every cycle produces a [`CycleReport`] with per-collector counters; the
//! most recent report is shared with status reporting through a
//! [`ReportSlot`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Counters for one collector within one archive cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorCycleResult {
    /// Collector namespace these counters belong to
    pub collector: String,

    /// Local artifacts examined (the `latest` alias is never listed)
    pub scanned: u64,

    /// Artifacts old enough to leave the local tier
    pub eligible: u64,

    /// Artifacts uploaded to the remote tier this cycle
    pub uploaded: u64,

    /// Artifacts already present remotely, upload skipped
    pub skipped: u64,

    /// Local copies removed after remote presence was confirmed
    pub deleted: u64,

    /// Artifacts left local because migration failed
    pub errors: u64,

    /// Empty date directories removed during compaction
    pub compacted_dirs: u32,
}

impl CollectorCycleResult {
    /// Create empty counters for `collector`
    pub fn new(collector: &str) -> Self {
        Self {
            collector: collector.to_string(),
            ..Self::default()
        }
    }

    /// Record an upload to the remote tier
    pub fn record_uploaded(&mut self) {
        self.uploaded += 1;
    }

    /// Record an artifact found already archived
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Record a confirmed local deletion
    pub fn record_deleted(&mut self) {
        self.deleted += 1;
    }

    /// Record a failed migration
    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    /// Whether every migration for this collector succeeded
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}

/// Outcome of one archive cycle across all collectors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    /// Unique id for correlating this cycle in logs
    pub run_id: Uuid,

    /// When the cycle started
    pub started_at: DateTime<Utc>,

    /// Total cycle duration in milliseconds
    pub duration_ms: u64,

    /// Per-collector counters, sorted by collector name
    pub collectors: Vec<CollectorCycleResult>,
}

impl CycleReport {
    /// Create an empty report stamped with a fresh run id
    pub fn new() -> Self {
        Self {
            run_id: Uuid::now_v7(),
            started_at: Utc::now(),
            duration_ms: 0,
            collectors: Vec::new(),
        }
    }

    /// Get total artifacts scanned across all collectors
    pub fn total_scanned(&self) -> u64 {
        self.collectors.iter().map(|c| c.scanned).sum()
    }

    /// Get total uploads across all collectors
    pub fn total_uploaded(&self) -> u64 {
        self.collectors.iter().map(|c| c.uploaded).sum()
    }

    /// Get total skipped artifacts across all collectors
    pub fn total_skipped(&self) -> u64 {
        self.collectors.iter().map(|c| c.skipped).sum()
    }

    /// Get total confirmed local deletions across all collectors
    pub fn total_deleted(&self) -> u64 {
        self.collectors.iter().map(|c| c.deleted).sum()
    }

    /// Get total failed migrations across all collectors
    pub fn total_errors(&self) -> u64 {
        self.collectors.iter().map(|c| c.errors).sum()
    }

    /// Whether the whole cycle completed without artifact errors
    pub fn is_clean(&self) -> bool {
        self.total_errors() == 0
    }

    /// Generate a summary report of the cycle
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Archive Cycle Report".to_string(),
            "====================".to_string(),
            format!("Run: {}", self.run_id),
            format!("Started: {}", self.started_at.to_rfc3339()),
            format!("Duration: {}ms", self.duration_ms),
            String::new(),
        ];

        for result in &self.collectors {
            lines.push(format!(
                "  {}: {} scanned, {} uploaded, {} skipped, {} deleted, {} errors",
                result.collector,
                result.scanned,
                result.uploaded,
                result.skipped,
                result.deleted,
                result.errors
            ));
        }

        if !self.collectors.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!(
            "Totals: {} uploaded, {} skipped, {} deleted, {} errors",
            self.total_uploaded(),
            self.total_skipped(),
            self.total_deleted(),
            self.total_errors()
        ));

        lines.join("\n")
    }
}

impl Default for CycleReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to the most recent cycle report
///
/// The archive job publishes each completed report here; status reporting
/// reads it without blocking the next cycle. Clones share one slot.
#[derive(Debug, Clone, Default)]
pub struct ReportSlot {
    inner: Arc<RwLock<Option<CycleReport>>>,
}

impl ReportSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a completed report, replacing any previous one
    pub fn publish(&self, report: CycleReport) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(report);
    }

    /// The most recently published report, if any cycle has completed
    pub fn latest(&self) -> Option<CycleReport> {
        let guard = match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone()
    }
}

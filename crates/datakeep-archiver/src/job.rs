//! Archive job - migrates aged artifacts from the local tier to the remote
//! tier
//!
//! A cycle scans local collectors, migrates every artifact past retention
//! with copy-verify-delete ordering, then compacts emptied date directories.
//! Failures are isolated per artifact; a failed artifact stays local and is
//! retried on the next cycle.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use datakeep_domain::{ArtifactMeta, ArtifactStore, RetentionPolicy, StoreError};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ArchiveConfig;
use crate::error::ArchiveError;
use crate::report::{CollectorCycleResult, CycleReport, ReportSlot};
use crate::retry::RetryPolicy;

/// Nightly migration job between the local and remote tiers
///
/// The job never runs two cycles at once: a trigger arriving while a cycle
/// is in flight is logged and dropped. Collectors within a cycle are
/// processed by a bounded worker pool.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use datakeep_archiver::{ArchiveConfig, ArchiveJob};
/// use datakeep_store::MemoryStore;
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let local = Arc::new(MemoryStore::new());
/// let remote = Arc::new(MemoryStore::new());
/// let job = ArchiveJob::new(local, remote, ArchiveConfig::default());
///
/// if let Some(report) = job.run_cycle(&CancellationToken::new()).await? {
///     println!("{}", report.summary());
/// }
/// # Ok(())
/// # }
/// ```
pub struct ArchiveJob {
    local: Arc<dyn ArtifactStore>,
    remote: Arc<dyn ArtifactStore>,
    config: ArchiveConfig,
    retry: RetryPolicy,
    running: Mutex<()>,
    reports: ReportSlot,
}

impl ArchiveJob {
    /// Create a job migrating from `local` to `remote`
    pub fn new(
        local: Arc<dyn ArtifactStore>,
        remote: Arc<dyn ArtifactStore>,
        config: ArchiveConfig,
    ) -> Self {
        let retry = config.retry_policy();
        Self {
            local,
            remote,
            config,
            retry,
            running: Mutex::new(()),
            reports: ReportSlot::new(),
        }
    }

    /// The configuration this job runs with
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Handle to the most recent cycle report
    pub fn report_slot(&self) -> ReportSlot {
        self.reports.clone()
    }

    /// Run one cycle, evaluating retention against today's local date
    ///
    /// Returns `Ok(None)` when a cycle is already in flight.
    pub async fn run_cycle(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<CycleReport>, ArchiveError> {
        self.run_cycle_at(Local::now().date_naive(), cancel).await
    }

    /// Run one cycle, evaluating retention as of `today`
    ///
    /// Scheduled runs use [`run_cycle`]; passing the date explicitly keeps
    /// cycle behavior reproducible for backfills and tests.
    ///
    /// [`run_cycle`]: ArchiveJob::run_cycle
    pub async fn run_cycle_at(
        &self,
        today: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<Option<CycleReport>, ArchiveError> {
        let Ok(_running) = self.running.try_lock() else {
            info!("archive cycle already running, trigger ignored");
            return Ok(None);
        };

        let clock = Instant::now();
        let mut report = CycleReport::new();
        info!(run_id = %report.run_id, %today, "archive cycle started");

        let collectors = self.local.list_collectors().await?;
        debug!(collectors = collectors.len(), "local scan complete");

        let limit = Arc::new(Semaphore::new(self.config.max_concurrent_collectors.max(1)));
        let mut tasks: JoinSet<CollectorCycleResult> = JoinSet::new();
        for collector in collectors {
            let local = Arc::clone(&self.local);
            let remote = Arc::clone(&self.remote);
            let policy = self.config.retention();
            let retry = self.retry;
            let limit = Arc::clone(&limit);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = tokio::select! {
                    permit = limit.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return CollectorCycleResult::new(&collector),
                    },
                    _ = cancel.cancelled() => return CollectorCycleResult::new(&collector),
                };
                archive_collector(local, remote, policy, retry, today, collector, cancel).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => report.collectors.push(result),
                Err(err) => return Err(ArchiveError::Worker(err.to_string())),
            }
        }
        report.collectors.sort_by(|a, b| a.collector.cmp(&b.collector));
        report.duration_ms = clock.elapsed().as_millis() as u64;

        if report.is_clean() {
            info!(
                run_id = %report.run_id,
                uploaded = report.total_uploaded(),
                skipped = report.total_skipped(),
                deleted = report.total_deleted(),
                duration_ms = report.duration_ms,
                "archive cycle finished"
            );
        } else {
            warn!(
                run_id = %report.run_id,
                errors = report.total_errors(),
                uploaded = report.total_uploaded(),
                duration_ms = report.duration_ms,
                "archive cycle finished with errors"
            );
        }

        self.reports.publish(report.clone());
        Ok(Some(report))
    }
}

/// Migrate and compact one collector, absorbing per-artifact failures
async fn archive_collector(
    local: Arc<dyn ArtifactStore>,
    remote: Arc<dyn ArtifactStore>,
    policy: RetentionPolicy,
    retry: RetryPolicy,
    today: NaiveDate,
    collector: String,
    cancel: CancellationToken,
) -> CollectorCycleResult {
    let mut result = CollectorCycleResult::new(&collector);

    let metas = match local.list(&collector, None).await {
        Ok(metas) => metas,
        Err(err) => {
            warn!(collector, error = %err, "listing local artifacts failed");
            result.record_error();
            return result;
        }
    };
    result.scanned = metas.len() as u64;

    for meta in &metas {
        if cancel.is_cancelled() {
            debug!(collector, "cancelled, leaving remaining artifacts local");
            return result;
        }
        if !policy.is_eligible(meta.partition_date(), today) {
            continue;
        }
        result.eligible += 1;

        match migrate_artifact(local.as_ref(), remote.as_ref(), &retry, &cancel, meta).await {
            Ok(MigrationOutcome::Uploaded) => {
                debug!(key = %meta.key(), "artifact migrated");
                result.record_uploaded();
                result.record_deleted();
            }
            Ok(MigrationOutcome::AlreadyRemote) => {
                debug!(key = %meta.key(), "already archived, removed local copy");
                result.record_skipped();
                result.record_deleted();
            }
            Err(err) => {
                warn!(key = %meta.key(), error = %err, "artifact migration failed");
                result.record_error();
            }
        }
    }

    // compaction only runs for a collector whose cycle was fully clean
    if result.is_clean() && !cancel.is_cancelled() {
        match local.remove_empty_dirs(&collector).await {
            Ok(removed) => result.compacted_dirs = removed,
            Err(err) => {
                warn!(collector, error = %err, "compaction failed");
                result.record_error();
            }
        }
    } else if !result.is_clean() {
        debug!(collector, errors = result.errors, "compaction withheld");
    }

    result
}

enum MigrationOutcome {
    Uploaded,
    AlreadyRemote,
}

/// Move one artifact with copy-verify-delete ordering
///
/// The local copy is removed only after the remote tier confirms the key.
/// A key already present remotely is not re-uploaded; the local copy is
/// still removed, which makes interrupted cycles safe to re-run.
async fn migrate_artifact(
    local: &dyn ArtifactStore,
    remote: &dyn ArtifactStore,
    retry: &RetryPolicy,
    cancel: &CancellationToken,
    meta: &ArtifactMeta,
) -> Result<MigrationOutcome, StoreError> {
    let collector = meta.collector.as_str();
    let relative = meta.path.relative();
    let rel = relative.as_str();
    let key = meta.key();

    let already_remote = retry
        .run("head", &key, cancel, || remote.exists(collector, rel))
        .await?;

    let outcome = if already_remote {
        MigrationOutcome::AlreadyRemote
    } else {
        let bytes = retry
            .run("read", &key, cancel, || local.get(collector, rel))
            .await?;
        let content_type = content_type_for(meta.path.filename());
        // upload and confirmation retry as one unit so a verification miss
        // re-uploads rather than trusting a stale probe
        retry
            .run("upload", &key, cancel, || {
                let bytes = bytes.clone();
                async move {
                    remote.put(collector, rel, bytes, content_type).await?;
                    if !remote.exists(collector, rel).await? {
                        return Err(StoreError::unverified(collector, rel));
                    }
                    Ok(())
                }
            })
            .await?;
        MigrationOutcome::Uploaded
    };

    match retry
        .run("delete", &key, cancel, || local.delete(collector, rel))
        .await
    {
        // a local copy that is already gone still counts as removed
        Ok(()) | Err(StoreError::NotFound { .. }) => Ok(outcome),
        Err(err) => Err(err),
    }
}

fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext) {
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

//! Background worker driving the archive job on a daily schedule

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime, TimeZone};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::ArchiveConfig;
use crate::error::ArchiveError;
use crate::job::ArchiveJob;
use crate::report::CycleReport;

/// Background worker that runs the archive job once per day
///
/// The worker sleeps until the configured local wall-clock time, runs one
/// cycle, then schedules the next day's run. When archival is disabled it
/// parks until shutdown so the embedding process keeps a uniform task set.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use datakeep_archiver::{ArchiveConfig, ArchiveJob, ArchiveWorker};
/// use datakeep_store::MemoryStore;
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ArchiveConfig::default();
/// let job = Arc::new(ArchiveJob::new(
///     Arc::new(MemoryStore::new()),
///     Arc::new(MemoryStore::new()),
///     config.clone(),
/// ));
///
/// let worker = ArchiveWorker::new(job, &config)?;
/// worker.run(CancellationToken::new()).await?;
/// # Ok(())
/// # }
/// ```
pub struct ArchiveWorker {
    job: Arc<ArchiveJob>,
    trigger: NaiveTime,
    enabled: bool,
}

impl ArchiveWorker {
    /// Create a worker around `job`
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::Configuration` if `archive_time` is not
    /// `HH:MM`.
    pub fn new(job: Arc<ArchiveJob>, config: &ArchiveConfig) -> Result<Self, ArchiveError> {
        let trigger = config.trigger_time().ok_or_else(|| {
            ArchiveError::Configuration(format!(
                "archive_time '{}' is not HH:MM",
                config.archive_time
            ))
        })?;
        Ok(Self {
            job,
            trigger,
            enabled: config.enabled,
        })
    }

    /// Run until the token is cancelled
    ///
    /// A failed cycle is logged and the worker keeps its schedule; the next
    /// day's run retries whatever stayed local.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), ArchiveError> {
        if !self.enabled {
            info!("archival disabled, worker idle until shutdown");
            cancel.cancelled().await;
            return Ok(());
        }

        info!(trigger = %self.trigger.format("%H:%M"), "archive worker started");

        loop {
            let wait = self.until_next_trigger();
            debug!(?wait, "sleeping until next archive run");

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    match self.job.run_cycle(&cancel).await {
                        Ok(Some(report)) => info!("{}", report.summary()),
                        Ok(None) => {}
                        Err(err) => error!(error = %err, "archive cycle failed"),
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown requested, stopping archive worker");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Run a single immediate cycle, bypassing the schedule
    ///
    /// Used for manual triggers; runs even when the schedule is disabled.
    pub async fn run_once(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<CycleReport>, ArchiveError> {
        self.job.run_cycle(cancel).await
    }

    fn until_next_trigger(&self) -> Duration {
        let now = Local::now();
        let next = next_trigger(now.naive_local(), self.trigger);
        match Local.from_local_datetime(&next).earliest() {
            Some(next_local) => (next_local - now).to_std().unwrap_or(Duration::ZERO),
            // a DST gap swallowed the trigger; fall back to naive arithmetic
            None => (next - now.naive_local()).to_std().unwrap_or(Duration::ZERO),
        }
    }
}

/// Next wall-clock datetime matching `trigger`, strictly after `now`
fn next_trigger(now: NaiveDateTime, trigger: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(trigger);
    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}

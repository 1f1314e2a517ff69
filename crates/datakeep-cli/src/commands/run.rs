//! Run command, the long-lived service mode

use std::sync::Arc;

use datakeep_archiver::{ArchiveJob, ArchiveWorker};
use datakeep_scheduler::{CollectorRegistry, Scheduler};
use datakeep_store::build_tiers;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::Result;
use crate::settings::Settings;

/// Execute the run command
///
/// Drives the scheduler loop and the archive worker until Ctrl+C. The
/// binary registers no collectors of its own; concrete collectors are wired
/// in by applications embedding the library crates. Archival still covers
/// artifacts produced by any writer of the data directory.
pub async fn execute_run(settings: Settings) -> Result<()> {
    print!("{}", settings.summary());

    let tiers = build_tiers(&settings.store).await?;
    let (local, remote) = super::tier_handles(&tiers);

    let cancel = CancellationToken::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal.cancel();
        }
    });

    let scheduler = Scheduler::new(local.clone(), CollectorRegistry::new());

    match remote {
        Some(remote) => {
            let job = Arc::new(ArchiveJob::new(local, remote, settings.archive.clone()));
            let worker = ArchiveWorker::new(job, &settings.archive)?;
            let (scheduled, archived) =
                tokio::join!(scheduler.run(cancel.clone()), worker.run(cancel.clone()));
            scheduled?;
            archived?;
        }
        None => {
            info!("no remote tier configured, archival idle");
            scheduler.run(cancel).await?;
        }
    }

    Ok(())
}

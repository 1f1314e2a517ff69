//! Archive command, a one-shot cycle

use datakeep_archiver::ArchiveJob;
use datakeep_store::build_tiers;
use tokio_util::sync::CancellationToken;

use crate::error::{CliError, Result};
use crate::settings::Settings;

/// Execute the archive command
///
/// Runs one cycle immediately, regardless of the configured schedule and
/// the enabled flag, and prints the cycle report. Ctrl+C cancels the cycle
/// cleanly; anything not yet migrated stays on the local tier.
pub async fn execute_archive(settings: Settings) -> Result<()> {
    let tiers = build_tiers(&settings.store).await?;
    let (local, remote) = super::tier_handles(&tiers);
    let Some(remote) = remote else {
        return Err(CliError::Config(
            "archiving requires a remote tier; set S3_BUCKET".to_string(),
        ));
    };

    let cancel = CancellationToken::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    let job = ArchiveJob::new(local, remote, settings.archive.clone());
    match job.run_cycle(&cancel).await? {
        Some(report) => println!("{}", report.summary()),
        None => println!("An archive cycle is already running"),
    }
    Ok(())
}

//! Get command

use std::io::Write;

use datakeep_resolver::Resolver;
use datakeep_store::build_tiers;
use tracing::info;

use crate::cli::GetArgs;
use crate::error::Result;
use crate::settings::Settings;

/// Execute the get command
///
/// Writes the artifact bytes to stdout untouched; the answering tier goes
/// to stderr so pipelines stay clean.
pub async fn execute_get(args: GetArgs, settings: Settings) -> Result<()> {
    let tiers = build_tiers(&settings.store).await?;
    let (local, remote) = super::tier_handles(&tiers);
    let resolver = Resolver::new(local, remote);

    let resolved = match &args.key {
        Some(key) => resolver.get(&args.collector, key).await?,
        None => resolver.latest(&args.collector).await?,
    };
    info!(
        collector = %args.collector,
        source = %resolved.source,
        bytes = resolved.value.len(),
        "artifact resolved"
    );

    std::io::stdout().write_all(&resolved.value)?;
    Ok(())
}

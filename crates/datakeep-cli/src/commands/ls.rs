//! Ls command

use datakeep_domain::PartitionDate;
use datakeep_resolver::Resolver;
use datakeep_store::build_tiers;
use tracing::info;

use crate::cli::LsArgs;
use crate::error::Result;
use crate::settings::Settings;

/// Execute the ls command
pub async fn execute_ls(args: LsArgs, settings: Settings) -> Result<()> {
    let tiers = build_tiers(&settings.store).await?;
    let (local, remote) = super::tier_handles(&tiers);
    let resolver = Resolver::new(local, remote);

    let date = args.date.map(PartitionDate::new);
    let resolved = resolver.list_files(&args.collector, date).await?;
    info!(
        collector = %args.collector,
        source = %resolved.source,
        artifacts = resolved.value.len(),
        "listing resolved"
    );

    for meta in &resolved.value {
        println!("{:>12}  {}", meta.size_bytes, meta.path.relative());
    }
    Ok(())
}

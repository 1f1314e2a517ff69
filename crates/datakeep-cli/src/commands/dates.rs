//! Dates command

use datakeep_resolver::Resolver;
use datakeep_store::build_tiers;

use crate::cli::DatesArgs;
use crate::error::Result;
use crate::settings::Settings;

/// Execute the dates command
pub async fn execute_dates(args: DatesArgs, settings: Settings) -> Result<()> {
    let tiers = build_tiers(&settings.store).await?;
    let (local, remote) = super::tier_handles(&tiers);
    let resolver = Resolver::new(local, remote);

    for date in resolver.list_dates(&args.collector).await? {
        println!("{}", date);
    }
    Ok(())
}

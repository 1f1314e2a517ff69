//! Command implementations

pub mod archive;
pub mod dates;
pub mod get;
pub mod ls;
pub mod run;
pub mod status;

pub use self::archive::execute_archive;
pub use self::dates::execute_dates;
pub use self::get::execute_get;
pub use self::ls::execute_ls;
pub use self::run::execute_run;
pub use self::status::execute_status;

use std::sync::Arc;

use datakeep_domain::ArtifactStore;
use datakeep_store::Tiers;

/// Tier handles as trait objects, the shape the service crates take
pub(crate) fn tier_handles(
    tiers: &Tiers,
) -> (Arc<dyn ArtifactStore>, Option<Arc<dyn ArtifactStore>>) {
    let local: Arc<dyn ArtifactStore> = tiers.local.clone();
    let remote = tiers
        .remote
        .clone()
        .map(|remote| remote as Arc<dyn ArtifactStore>);
    (local, remote)
}
